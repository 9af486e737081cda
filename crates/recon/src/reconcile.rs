use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    Asn, CandidateRecord, CanonicalSet, ReconciliationResult, SourceContribution, SourceStats,
};

/// Merge contributions in precedence order (index 0 = highest).
///
/// Canonical members are discarded regardless of precedence. Among the rest,
/// the first source to report an ASN keeps it; later reports are dropped.
/// Within one source, duplicate reports of an ASN keep the lowest-sorting
/// description so the outcome does not depend on record order.
pub fn reconcile(canonical: &CanonicalSet, contributions: &[SourceContribution]) -> ReconciliationResult {
    let mut entries: BTreeMap<Asn, CandidateRecord> = BTreeMap::new();
    let mut sources = Vec::with_capacity(contributions.len());

    for contribution in contributions {
        let mut found = BTreeSet::new();
        let mut missing = 0;
        let mut accepted = 0;

        for record in normalized(&contribution.records) {
            found.insert(record.asn);
            if canonical.contains(record.asn) {
                continue;
            }
            missing += 1;
            if let Entry::Vacant(slot) = entries.entry(record.asn) {
                slot.insert(record.clone());
                accepted += 1;
            }
        }

        sources.push(SourceStats {
            name: contribution.name.clone(),
            status: contribution.status.clone(),
            found: found.len(),
            missing,
            accepted,
        });
    }

    ReconciliationResult {
        canonical_len: canonical.len(),
        entries,
        sources,
    }
}

/// One record per ASN, in ASN order.
fn normalized(records: &[CandidateRecord]) -> impl Iterator<Item = &CandidateRecord> {
    let mut by_asn: BTreeMap<Asn, &CandidateRecord> = BTreeMap::new();
    for record in records {
        by_asn
            .entry(record.asn)
            .and_modify(|kept| {
                if (&record.description, &record.source) < (&kept.description, &kept.source) {
                    *kept = record;
                }
            })
            .or_insert(record);
    }
    by_asn.into_values()
}
