//! Tolerant HTML tokenizer for search-result pages.
//!
//! Splits markup into text runs and attribute values so extraction passes
//! can run over labeled patterns instead of whole-document regexes.
//! Never fails: unterminated tags, stray `<` and garbage are absorbed.
//! `<script>` / `<style>` bodies and comments are skipped.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Character data between tags, entities decoded.
    Text(String),
    /// An attribute value inside a tag, entities decoded.
    Attr { name: String, value: String },
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Attr { value, .. } => value,
        }
    }
}

/// Which tokens a pattern is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Text,
    Attrs,
    All,
}

impl Scope {
    fn admits(self, token: &Token) -> bool {
        match (self, token) {
            (Self::All, _) => true,
            (Self::Text, Token::Text(_)) => true,
            (Self::Attrs, Token::Attr { .. }) => true,
            _ => false,
        }
    }
}

/// A regex with a name, so callers can tell passes apart in results.
#[derive(Debug, Clone)]
pub struct LabeledPattern {
    pub label: &'static str,
    pub regex: Regex,
}

impl LabeledPattern {
    pub fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).unwrap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledMatch {
    pub label: &'static str,
    /// The whole matched substring.
    pub text: String,
    /// Capture groups 1..n; `None` for groups that did not participate.
    pub groups: Vec<Option<String>>,
}

impl LabeledMatch {
    pub fn group(&self, n: usize) -> Option<&str> {
        self.groups.get(n.checked_sub(1)?)?.as_deref()
    }
}

/// Find every substring matching `pattern` inside the admitted tokens.
pub fn find_all(tokens: &[Token], pattern: &LabeledPattern, scope: Scope) -> Vec<LabeledMatch> {
    let mut out = Vec::new();
    for token in tokens.iter().filter(|t| scope.admits(t)) {
        for caps in pattern.regex.captures_iter(token.as_str()) {
            let groups = (1..caps.len())
                .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                .collect();
            out.push(LabeledMatch {
                label: pattern.label,
                text: caps[0].to_string(),
                groups,
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

pub fn tokenize(html: &str) -> Vec<Token> {
    let lower = html.to_ascii_lowercase();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            flush_text(&mut text, &mut tokens);
            pos += rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            continue;
        }

        if is_tag_start(rest) {
            flush_text(&mut text, &mut tokens);
            let (inner, consumed) = tag_body(rest);
            let tag = parse_tag(inner);
            for (name, value) in tag.attrs {
                tokens.push(Token::Attr {
                    name,
                    value: decode_entities(&value),
                });
            }
            pos += consumed;

            if !tag.closing && !tag.self_closing && (tag.name == "script" || tag.name == "style") {
                let needle = format!("</{}", tag.name);
                pos = match lower[pos..].find(&needle) {
                    Some(i) => {
                        let close = pos + i;
                        html[close..].find('>').map(|j| close + j + 1).unwrap_or(html.len())
                    }
                    None => html.len(),
                };
            }
            continue;
        }

        // Plain text up to the next '<' (which may or may not start a tag).
        let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let next = rest[first..].find('<').map(|i| i + first).unwrap_or(rest.len());
        text.push_str(&rest[..next]);
        pos += next;
    }

    flush_text(&mut text, &mut tokens);
    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.trim().is_empty() {
        tokens.push(Token::Text(decode_entities(text)));
    }
    text.clear();
}

fn is_tag_start(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

/// Returns the text between `<` and `>` plus the number of bytes consumed.
/// Quoted attribute values may contain `>`.
fn tag_body(s: &str) -> (&str, usize) {
    let mut quote: Option<u8> = None;
    for (i, b) in s.bytes().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return (&s[1..i], i + 1),
            None => {}
        }
    }
    (&s[1..], s.len())
}

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: Vec<(String, String)>,
}

fn parse_tag(inner: &str) -> Tag {
    let closing = inner.starts_with('/');
    let body = inner.trim_start_matches('/');
    let self_closing = body.trim_end().ends_with('/');
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let bytes = body.as_bytes();
    let mut i = name_end;
    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        if start == i {
            i += 1;
            continue;
        }
        let attr_name = body[start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let q = bytes[i];
            let vstart = i + 1;
            let vend = body[vstart..].bytes().position(|b| b == q).map(|p| vstart + p).unwrap_or(bytes.len());
            i = (vend + 1).min(bytes.len());
            &body[vstart..vend]
        } else {
            let vstart = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            &body[vstart..i]
        };
        attrs.push((attr_name, value.to_string()));
    }

    Tag {
        name,
        closing,
        self_closing,
        attrs,
    }
}

/// Decode the handful of entities that show up in result snippets.
/// Unknown entities are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let semi = tail.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i);
        let decoded = semi.and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
