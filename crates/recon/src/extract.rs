//! Identifier extraction from arbitrary text.
//!
//! The extractor is a pure function of (text, pattern, range). It never
//! fails on input: unparsable or out-of-range numbers are discarded.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::ReconError;
use crate::model::{Asn, AsnRange};

/// Optional `AS` prefix followed by a 4 to 7 digit run.
pub const DEFAULT_PATTERN: &str = r"(?:AS)?([0-9]{4,7})";

#[derive(Debug, Clone)]
pub struct Extractor {
    pattern: Regex,
    range: AsnRange,
}

impl Extractor {
    /// Compile a custom pattern. Capture group 1 holds the number; a pattern
    /// without groups uses the whole match.
    pub fn new(pattern: &str, range: AsnRange) -> Result<Self, ReconError> {
        let pattern = Regex::new(pattern).map_err(|e| ReconError::Pattern {
            source: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern, range })
    }

    pub fn with_range(range: AsnRange) -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).unwrap(),
            range,
        }
    }

    /// Default pattern, bounded to [`AsnRange::RAW`].
    pub fn raw() -> Self {
        Self::with_range(AsnRange::RAW)
    }

    /// Default pattern, bounded to [`AsnRange::SEARCH`].
    pub fn search() -> Self {
        Self::with_range(AsnRange::SEARCH)
    }

    pub fn range(&self) -> AsnRange {
        self.range
    }

    pub fn extract(&self, text: &str) -> BTreeSet<Asn> {
        let mut found = BTreeSet::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                continue;
            };
            if !is_whole_digit_run(text, m.start(), m.end()) {
                continue;
            }
            if let Some(asn) = parse_bounded(m.as_str(), self.range) {
                found.insert(asn);
            }
        }
        found
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::raw()
    }
}

/// Parse a digit string and keep it only if it lies inside `range`.
pub fn parse_bounded(digits: &str, range: AsnRange) -> Option<Asn> {
    let value: u32 = digits.parse().ok()?;
    range.contains(value).then_some(Asn(value))
}

/// A match must not be a slice of a longer digit run: `AS999999999`
/// must not yield `9999999`.
pub(crate) fn is_whole_digit_run(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before = start.checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(end).copied();
    !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
}

/// Best-effort UTF-8 decoding: invalid sequences are dropped, a leading
/// BOM is removed. Never fails.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    match out.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}
