//! Source adapters: fetched content → candidate records.
//!
//! Adapters are pure and infallible. Whatever the content looks like, the
//! worst outcome is an empty contribution.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::extract::{parse_bounded, Extractor};
use crate::model::{Asn, AsnRange, CandidateRecord};
use crate::tokenize::{find_all, tokenize, LabeledPattern, Scope, Token};

/// Search-result descriptions are cut to this many characters.
pub const MAX_CONTEXT_DESCRIPTION: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain text list, one or more ASNs per line in any notation.
    Plain,
    /// CSV export; every field is scanned.
    Csv,
    /// Search-engine HTML result page.
    Search,
}

impl SourceKind {
    pub fn default_range(self) -> AsnRange {
        match self {
            Self::Plain | Self::Csv => AsnRange::RAW,
            Self::Search => AsnRange::SEARCH,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Csv => write!(f, "csv"),
            Self::Search => write!(f, "search"),
        }
    }
}

/// Turn decoded source content into records, sorted by ASN, one per ASN.
pub fn adapt(kind: SourceKind, source: &str, text: &str, extractor: &Extractor) -> Vec<CandidateRecord> {
    match kind {
        SourceKind::Plain => adapt_plain(source, text, extractor),
        SourceKind::Csv => adapt_csv(source, text, extractor),
        SourceKind::Search => adapt_search(source, text, extractor),
    }
}

pub fn adapt_plain(source: &str, text: &str, extractor: &Extractor) -> Vec<CandidateRecord> {
    extractor
        .extract(text)
        .into_iter()
        .map(|asn| CandidateRecord::new(asn, source, source))
        .collect()
}

/// Scan every CSV field. Malformed records are skipped; content the CSV
/// reader rejects outright falls back to a plain scan.
pub fn adapt_csv(source: &str, text: &str, extractor: &Extractor) -> Vec<CandidateRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut found = std::collections::BTreeSet::new();
    let mut parsed_any = false;
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        parsed_any = true;
        for field in record.iter() {
            found.extend(extractor.extract(field));
        }
    }

    if !parsed_any {
        return adapt_plain(source, text, extractor);
    }

    found
        .into_iter()
        .map(|asn| CandidateRecord::new(asn, source, source))
        .collect()
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// Pass precedence inside one result page: higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SearchPass {
    General,
    Link,
    Context,
}

/// Three passes over the tokenized page, all bounded by the extractor's
/// range:
///
/// 1. general numeric scan of text tokens (description = source name),
/// 2. `spur.us/context/...` links carrying `AS<n>` (description = link),
/// 3. `AS<n> - <description>` snippets (description = first 50 chars).
///
/// When passes disagree the later (richer) pass wins.
pub fn adapt_search(source: &str, html: &str, extractor: &Extractor) -> Vec<CandidateRecord> {
    let range = extractor.range();
    let tokens = tokenize(html);
    let mut best: BTreeMap<Asn, (SearchPass, String)> = BTreeMap::new();

    let mut offer = |asn: Asn, pass: SearchPass, description: String| {
        let replace = best.get(&asn).map_or(true, |(existing, _)| *existing < pass);
        if replace {
            best.insert(asn, (pass, description));
        }
    };

    for token in tokens.iter().filter(|t| matches!(t, Token::Text(_))) {
        for asn in extractor.extract(token.as_str()) {
            offer(asn, SearchPass::General, source.to_string());
        }
    }

    let link = LabeledPattern::new("spur_link", r#"spur\.us/context/[^"'>\s]+"#);
    let link_asn = regex::Regex::new(r"AS([0-9]+)").unwrap();
    for hit in find_all(&tokens, &link, Scope::All) {
        let Some(caps) = link_asn.captures(&hit.text) else {
            continue;
        };
        if let Some(asn) = parse_bounded(&caps[1], range) {
            offer(asn, SearchPass::Link, hit.text.clone());
        }
    }

    let context = LabeledPattern::new("asn_context", r"AS([0-9]{4,6})\s*[-–—]\s*([^\n]+)");
    for hit in find_all(&tokens, &context, Scope::Text) {
        let (Some(digits), Some(tail)) = (hit.group(1), hit.group(2)) else {
            continue;
        };
        let Some(asn) = parse_bounded(digits, range) else {
            continue;
        };
        let description = truncate_chars(tail.trim(), MAX_CONTEXT_DESCRIPTION);
        if description.is_empty() {
            continue;
        }
        offer(asn, SearchPass::Context, description);
    }

    best.into_iter()
        .map(|(asn, (_, description))| CandidateRecord::new(asn, description, source))
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn asns(records: &[CandidateRecord]) -> Vec<u32> {
        records.iter().map(|r| r.asn.value()).collect()
    }

    #[test]
    fn plain_list_uses_source_name() {
        let text = "AS9009\nAS16276 # OVH\n123\n";
        let records = adapt(SourceKind::Plain, "X4BNet VPN", text, &Extractor::raw());
        assert_eq!(asns(&records), vec![9009, 16276]);
        assert!(records.iter().all(|r| r.description == "X4BNet VPN" && r.source == "X4BNet VPN"));
    }

    #[test]
    fn csv_scans_every_field() {
        let text = "ASN,Entity\n14061,DigitalOcean\n\"16276\",\"OVH, SAS\"\n24940,Hetzner AS213230\n";
        let records = adapt(SourceKind::Csv, "bad-asn", text, &Extractor::raw());
        assert_eq!(asns(&records), vec![14061, 16276, 24940, 213230]);
    }

    #[test]
    fn csv_with_ragged_rows() {
        let text = "1234\n5678,a,b,c\n\n9012,x\n";
        let records = adapt_csv("s", text, &Extractor::raw());
        assert_eq!(asns(&records), vec![1234, 5678, 9012]);
    }

    #[test]
    fn empty_content_is_empty_contribution() {
        for kind in [SourceKind::Plain, SourceKind::Csv, SourceKind::Search] {
            assert!(adapt(kind, "s", "", &Extractor::with_range(kind.default_range())).is_empty());
        }
    }

    #[test]
    fn search_context_beats_general_pass() {
        let html = r#"<div><a class="result__a">AS62240 - Clouvider Limited VPN exit nodes</a></div>
<div class="snippet">Seen on AS62240 and 54321</div>"#;
        let records = adapt_search("spur: vpn", html, &Extractor::search());
        assert_eq!(asns(&records), vec![54321, 62240]);
        assert_eq!(records[0].description, "spur: vpn");
        assert_eq!(records[1].description, "Clouvider Limited VPN exit nodes");
        assert!(records.iter().all(|r| r.source == "spur: vpn"));
    }

    #[test]
    fn search_link_pass() {
        let html = r#"<a href="https://spur.us/context/AS212238">Datacamp</a>"#;
        let records = adapt_search("q", html, &Extractor::search());
        assert_eq!(asns(&records), vec![212238]);
        assert_eq!(records[0].description, "spur.us/context/AS212238");
    }

    #[test]
    fn search_context_beats_link() {
        let html = r#"<a href="https://spur.us/context/AS212238">AS212238 – Datacamp Limited</a>"#;
        let records = adapt_search("q", html, &Extractor::search());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Datacamp Limited");
    }

    #[test]
    fn search_description_truncated_to_fifty_chars() {
        let long = "x".repeat(80);
        let html = format!("<p>AS12345 - {long}</p>");
        let records = adapt_search("q", &html, &Extractor::search());
        assert_eq!(records[0].description.chars().count(), MAX_CONTEXT_DESCRIPTION);
    }

    #[test]
    fn search_keeps_ascii_run_next_to_non_ascii_digit() {
        let html = "<p>AS12345\u{0666} - Mixed script</p>";
        let records = adapt_search("q", html, &Extractor::search());
        assert_eq!(asns(&records), vec![12345]);
        assert_eq!(records[0].description, "q");
    }

    #[test]
    fn search_respects_narrow_bound() {
        let html = r#"<p>AS1234567 - too big</p><a href="https://spur.us/context/AS2000000">x</a>"#;
        let records = adapt_search("q", html, &Extractor::search());
        assert!(records.is_empty(), "got {records:?}");
    }

    #[test]
    fn search_ignores_script_numbers() {
        let html = "<script>var t = 1700000;var u = 4242;</script><p>nothing</p>";
        assert!(adapt_search("q", html, &Extractor::search()).is_empty());
    }
}
