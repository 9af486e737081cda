// Property-based tests for extraction and reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use proptest::prelude::*;

use asnsweep_recon::extract::Extractor;
use asnsweep_recon::model::{Asn, AsnRange, CandidateRecord, CanonicalSet, SourceContribution};
use asnsweep_recon::reconcile::reconcile;
use asnsweep_recon::report::{annotated_view, paste_view};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small ASN pool so sources overlap often.
fn arb_asn() -> impl Strategy<Value = Asn> {
    (1000u32..1040).prop_map(Asn)
}

fn arb_source(name: &'static str) -> impl Strategy<Value = SourceContribution> {
    proptest::collection::vec((arb_asn(), "[a-z]{0,6}"), 0..20).prop_map(move |pairs| {
        SourceContribution::fetched(
            name,
            pairs
                .into_iter()
                .map(|(asn, desc)| CandidateRecord::new(asn, desc, name))
                .collect(),
        )
    })
}

fn arb_canonical() -> impl Strategy<Value = CanonicalSet> {
    proptest::collection::btree_set(arb_asn(), 0..15).prop_map(|s| s.into_iter().collect())
}

/// Noisy text: digit runs of every length, AS prefixes, junk.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            3 => r"(AS)?[0-9]{1,10}",
            2 => r"[ ,;\n#a-zA-Z]{0,6}",
            1 => r"\PC{0,4}",
        ],
        0..30,
    )
    .prop_map(|parts| parts.concat())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn canonical_members_never_in_result(
        canonical in arb_canonical(),
        a in arb_source("a"),
        b in arb_source("b"),
        c in arb_source("c"),
    ) {
        let result = reconcile(&canonical, &[a, b, c]);
        for asn in canonical.iter() {
            prop_assert!(result.get(asn).is_none());
        }
    }

    #[test]
    fn every_reported_non_canonical_asn_is_kept(
        canonical in arb_canonical(),
        a in arb_source("a"),
        b in arb_source("b"),
    ) {
        let expected: BTreeSet<Asn> = a.records.iter().chain(b.records.iter())
            .map(|r| r.asn)
            .filter(|asn| !canonical.contains(*asn))
            .collect();
        let result = reconcile(&canonical, &[a, b]);
        let got: BTreeSet<Asn> = result.entries.keys().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn higher_precedence_source_wins(
        canonical in arb_canonical(),
        a in arb_source("a"),
        b in arb_source("b"),
    ) {
        let a_asns: BTreeSet<Asn> = a.records.iter().map(|r| r.asn).collect();
        let result = reconcile(&canonical, &[a, b]);
        for (asn, record) in &result.entries {
            if a_asns.contains(asn) {
                prop_assert_eq!(record.source.as_str(), "a");
            } else {
                prop_assert_eq!(record.source.as_str(), "b");
            }
        }
    }

    #[test]
    fn record_order_does_not_change_output(
        canonical in arb_canonical(),
        a in arb_source("a"),
        b in arb_source("b"),
    ) {
        let mut a_rev = a.clone();
        a_rev.records.reverse();
        let mut b_rev = b.clone();
        b_rev.records.reverse();

        let r1 = reconcile(&canonical, &[a, b]);
        let r2 = reconcile(&canonical, &[a_rev, b_rev]);
        prop_assert_eq!(annotated_view(&r1), annotated_view(&r2));
        prop_assert_eq!(paste_view(&r1), paste_view(&r2));
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn extraction_respects_bounds(text in arb_text()) {
        for (extractor, range) in [
            (Extractor::raw(), AsnRange::RAW),
            (Extractor::search(), AsnRange::SEARCH),
        ] {
            for asn in extractor.extract(&text) {
                prop_assert!(range.contains(asn.value()), "{} outside {}", asn, range);
            }
        }
    }

    #[test]
    fn extraction_never_panics_on_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let text = asnsweep_recon::extract::decode_lossy(&bytes);
        let _ = Extractor::raw().extract(&text);
        let _ = asnsweep_recon::adapter::adapt_search("q", &text, &Extractor::search());
    }
}
