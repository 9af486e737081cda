//! Canonical list loader.
//!
//! A line is canonical iff it starts with `AS` immediately followed by
//! digits. Everything after the digit run is ignored.

use crate::error::ReconError;
use crate::model::{Asn, CanonicalSet};

/// Parse canonical list text. Non-matching lines are ignored.
pub fn parse_canonical(text: &str) -> CanonicalSet {
    text.lines().filter_map(line_asn).collect()
}

/// Load canonical list bytes. Fails when the content is not UTF-8 or holds
/// no `AS` line at all.
pub fn load_canonical(bytes: &[u8]) -> Result<CanonicalSet, ReconError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        ReconError::CanonicalParse(format!("not valid UTF-8 (byte offset {})", e.valid_up_to()))
    })?;
    let set = parse_canonical(text);
    if set.is_empty() {
        return Err(ReconError::CanonicalParse(
            "no lines of the form AS<number> found".into(),
        ));
    }
    Ok(set)
}

fn line_asn(line: &str) -> Option<Asn> {
    let rest = line.strip_prefix("AS")?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok().map(Asn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_line_start_only() {
        let text = "\
# header comment
AS9009 M247 Ltd
AS136787
  AS1234 indented
ASN5555
as7777 lowercase
AS16276\tOVH
";
        let set = parse_canonical(text);
        let got: Vec<u32> = set.iter().map(|a| a.value()).collect();
        assert_eq!(got, vec![9009, 16276, 136787]);
    }

    #[test]
    fn crlf_lines() {
        let set = parse_canonical("AS100 a\r\nAS200 b\r\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains(Asn(200)));
    }

    #[test]
    fn overflowing_number_is_ignored() {
        let set = parse_canonical("AS99999999999999 huge\nAS42 small\n");
        assert_eq!(set.len(), 1);
        assert!(set.contains(Asn(42)));
    }

    #[test]
    fn load_rejects_invalid_utf8() {
        let err = load_canonical(b"AS9009 ok\n\xff\xfe").unwrap_err();
        assert!(matches!(err, ReconError::CanonicalParse(_)));
    }

    #[test]
    fn load_rejects_list_without_entries() {
        let err = load_canonical(b"# nothing here\n").unwrap_err();
        assert!(err.to_string().contains("no lines"));
    }

    #[test]
    fn load_accepts_valid_list() {
        let set = load_canonical(b"AS9009 M247\n").unwrap();
        assert!(set.contains(Asn(9009)));
    }
}
