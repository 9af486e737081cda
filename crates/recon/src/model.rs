use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Autonomous System Number. Displays as `AS<n>`, serializes as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Asn(pub u32);

impl Asn {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

/// Inclusive plausible-range bound applied at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AsnRange {
    pub min: u32,
    pub max: u32,
}

impl AsnRange {
    /// Bound for raw text and CSV sources.
    pub const RAW: AsnRange = AsnRange { min: 1000, max: 9_999_999 };
    /// Narrower bound for search-result pages.
    pub const SEARCH: AsnRange = AsnRange { min: 1000, max: 999_999 };

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for AsnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One identifier reported by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub asn: Asn,
    pub description: String,
    pub source: String,
}

impl CandidateRecord {
    pub fn new(asn: Asn, description: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            asn,
            description: description.into(),
            source: source.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical set
// ---------------------------------------------------------------------------

/// Identifiers already present in the canonical list. Read-only for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalSet {
    asns: BTreeSet<Asn>,
}

impl CanonicalSet {
    pub fn contains(&self, asn: Asn) -> bool {
        self.asns.contains(&asn)
    }

    pub fn len(&self) -> usize {
        self.asns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Asn> + '_ {
        self.asns.iter().copied()
    }
}

impl FromIterator<Asn> for CanonicalSet {
    fn from_iter<I: IntoIterator<Item = Asn>>(iter: I) -> Self {
        Self {
            asns: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source contributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SourceStatus {
    Fetched,
    Failed(String),
}

impl SourceStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Everything one source contributed, in its precedence slot.
#[derive(Debug, Clone)]
pub struct SourceContribution {
    pub name: String,
    pub status: SourceStatus,
    pub records: Vec<CandidateRecord>,
}

impl SourceContribution {
    pub fn fetched(name: impl Into<String>, records: Vec<CandidateRecord>) -> Self {
        Self {
            name: name.into(),
            status: SourceStatus::Fetched,
            records,
        }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SourceStatus::Failed(reason.into()),
            records: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub name: String,
    pub status: SourceStatus,
    /// Distinct identifiers the source reported.
    pub found: usize,
    /// Of those, how many are absent from the canonical set.
    pub missing: usize,
    /// Of those, how many this source was first to claim.
    pub accepted: usize,
}

/// Identifiers absent from the canonical set, one chosen record each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub canonical_len: usize,
    pub entries: BTreeMap<Asn, CandidateRecord>,
    pub sources: Vec<SourceStats>,
}

impl ReconciliationResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, asn: Asn) -> Option<&CandidateRecord> {
        self.entries.get(&asn)
    }

    /// Entries in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateRecord> + '_ {
        self.entries.values()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceStats> + '_ {
        self.sources.iter().filter(|s| s.status.is_failed())
    }
}
