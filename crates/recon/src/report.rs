//! Text and JSON rendering of a reconciliation result.
//!
//! All views are sorted by ASN and are pure functions of the result, so two
//! renders of the same result are byte-identical.

use std::fmt::Write;

use serde::Serialize;

use crate::curated::CuratedTable;
use crate::model::{Asn, ReconciliationResult, SourceStats};

/// `AS<n> # <description>` per entry.
pub fn annotated_view(result: &ReconciliationResult) -> Vec<String> {
    result
        .iter()
        .map(|r| format!("{} # {}", r.asn, r.description).trim_end().to_string())
        .collect()
}

/// `AS<n> <organization>` per entry, ready to paste into the canonical list.
pub fn paste_view(result: &ReconciliationResult) -> Vec<String> {
    result
        .iter()
        .map(|r| format!("{} {}", r.asn, organization(&r.description)).trim_end().to_string())
        .collect()
}

/// Strip the parenthesized annotation: `"M247 Ltd (NordVPN)"` → `"M247 Ltd"`.
///
/// Cuts at the first `" ("`. A description that would become empty is kept.
pub fn organization(description: &str) -> &str {
    if !description.contains('(') {
        return description.trim();
    }
    match description.find(" (") {
        Some(i) if !description[..i].trim().is_empty() => description[..i].trim(),
        _ => description.trim(),
    }
}

/// Full stdout document: canonical count, annotated view, paste view, summary.
pub fn render_text(result: &ReconciliationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Current blocklist: {} ASNs", result.canonical_len);

    if result.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "All known ASNs are already in the blocklist!");
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Missing ASNs ({}) ===", result.len());
        let _ = writeln!(out);
        for line in annotated_view(result) {
            let _ = writeln!(out, "{line}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- Copy/paste format for all.txt ---");
        let _ = writeln!(out);
        for line in paste_view(result) {
            let _ = writeln!(out, "{line}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "=== Summary ===");
    let _ = writeln!(out, "Current: {} ASNs", result.canonical_len);
    let _ = writeln!(out, "Found missing: {} ASNs", result.len());
    let _ = writeln!(out, "After adding: {} ASNs", result.canonical_len + result.len());

    let failed: Vec<&str> = result.failed_sources().map(|s| s.name.as_str()).collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "Unreachable sources ({}): {}", failed.len(), failed.join(", "));
    }
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub canonical_count: usize,
    pub missing_count: usize,
    /// `updated` stamp of the curated table used for the run.
    pub curated_updated: Option<&'a str>,
    pub entries: Vec<JsonEntry<'a>>,
    pub sources: &'a [SourceStats],
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonEntry<'a> {
    pub asn: Asn,
    pub description: &'a str,
    pub organization: &'a str,
    pub source: &'a str,
    /// Curated group, only for entries the curated table supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'a str>,
}

impl<'a> JsonReport<'a> {
    pub fn new(result: &'a ReconciliationResult, curated: &'a CuratedTable) -> Self {
        Self {
            canonical_count: result.canonical_len,
            missing_count: result.len(),
            curated_updated: curated.updated(),
            entries: result
                .iter()
                .map(|r| JsonEntry {
                    asn: r.asn,
                    description: &r.description,
                    organization: organization(&r.description),
                    source: &r.source,
                    group: (r.source == curated.tag())
                        .then(|| curated.get(r.asn).and_then(|e| e.group.as_deref()))
                        .flatten(),
                })
                .collect(),
            sources: &result.sources,
        }
    }
}
