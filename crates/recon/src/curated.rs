//! Static curated table: hand-authored descriptions, highest precedence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Asn, AsnRange, CandidateRecord, SourceContribution};

const BUILTIN: &str = include_str!("../data/curated.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratedEntry {
    pub description: String,
    pub group: Option<String>,
}

/// Immutable once loaded. The table is handed to the pipeline explicitly.
#[derive(Debug, Clone)]
pub struct CuratedTable {
    tag: String,
    updated: Option<String>,
    entries: BTreeMap<Asn, CuratedEntry>,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default = "default_tag")]
    tag: String,
    #[serde(default)]
    updated: Option<String>,
    #[serde(default, rename = "entry")]
    entries: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    asn: u32,
    description: String,
    #[serde(default)]
    group: Option<String>,
}

fn default_tag() -> String {
    "curated".into()
}

impl CuratedTable {
    /// The table embedded at build time.
    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_toml(BUILTIN)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let raw: RawTable =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;

        if raw.tag.trim().is_empty() {
            return Err(ReconError::ConfigValidation("curated table tag is empty".into()));
        }

        let mut entries = BTreeMap::new();
        for entry in raw.entries {
            if !AsnRange::RAW.contains(entry.asn) {
                return Err(ReconError::ConfigValidation(format!(
                    "curated AS{} is outside {}",
                    entry.asn,
                    AsnRange::RAW
                )));
            }
            let asn = Asn(entry.asn);
            let value = CuratedEntry {
                description: entry.description,
                group: entry.group,
            };
            if entries.insert(asn, value).is_some() {
                return Err(ReconError::ConfigValidation(format!(
                    "curated table lists {asn} more than once"
                )));
            }
        }

        Ok(Self {
            tag: raw.tag,
            updated: raw.updated,
            entries,
        })
    }

    pub fn empty() -> Self {
        Self {
            tag: default_tag(),
            updated: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn updated(&self) -> Option<&str> {
        self.updated.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, asn: Asn) -> Option<&CuratedEntry> {
        self.entries.get(&asn)
    }

    /// Records carry the hand-authored description verbatim.
    pub fn contribution(&self) -> SourceContribution {
        let records = self
            .entries
            .iter()
            .map(|(asn, entry)| CandidateRecord::new(*asn, entry.description.clone(), self.tag.clone()))
            .collect();
        SourceContribution::fetched(self.tag.clone(), records)
    }
}
