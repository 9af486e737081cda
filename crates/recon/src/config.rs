use std::collections::HashSet;

use serde::Deserialize;

use crate::adapter::SourceKind;
use crate::error::ReconError;
use crate::extract::{Extractor, DEFAULT_PATTERN};
use crate::model::AsnRange;

const BUILTIN: &str = include_str!("../data/sources.toml");

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_name() -> String {
    "default".into()
}

// ---------------------------------------------------------------------------
// Fetch + Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification. Explicit opt-in only.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            insecure: false,
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Minimum pause between consecutive requests to the search host.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}

/// Floor for `search.delay_secs`. Search queries are never sent back to back.
pub const MIN_SEARCH_DELAY_SECS: u64 = 2;

fn default_delay_secs() -> u64 {
    MIN_SEARCH_DELAY_SECS
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: SourceKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// Override the kind's default lower bound.
    #[serde(default)]
    pub min_asn: Option<u32>,
    /// Override the kind's default upper bound.
    #[serde(default)]
    pub max_asn: Option<u32>,
    /// Override the extraction regex (capture group 1 = number).
    #[serde(default)]
    pub pattern: Option<String>,
}

impl SourceConfig {
    /// Name used for logging, stats, and as the default description.
    /// Search sources without a name are named after their query.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.query) {
            (Some(name), _) => name.clone(),
            (None, Some(query)) => format!("search: {query}"),
            (None, None) => self.url.clone().unwrap_or_default(),
        }
    }

    pub fn range(&self) -> AsnRange {
        let default = self.kind.default_range();
        AsnRange {
            min: self.min_asn.unwrap_or(default.min),
            max: self.max_asn.unwrap_or(default.max),
        }
    }

    pub fn extractor(&self) -> Result<Extractor, ReconError> {
        let pattern = self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN);
        Extractor::new(pattern, self.range()).map_err(|e| match e {
            ReconError::Pattern { message, .. } => ReconError::Pattern {
                source: self.display_name(),
                message,
            },
            other => other,
        })
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SweepConfig {
    /// Source list embedded at build time.
    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_toml(BUILTIN)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SweepConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ReconError::ConfigValidation(
                "fetch.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.delay_secs < MIN_SEARCH_DELAY_SECS {
            return Err(ReconError::ConfigValidation(format!(
                "search.delay_secs must be at least {MIN_SEARCH_DELAY_SECS}, got {}",
                self.search.delay_secs
            )));
        }

        if url::Url::parse(&self.search.endpoint).is_err() {
            return Err(ReconError::ConfigValidation(format!(
                "search.endpoint is not a valid URL: {}",
                self.search.endpoint
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            let name = source.display_name();
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation("source with empty name".into()));
            }
            if !seen.insert(name.clone()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate source name '{name}'"
                )));
            }

            match source.kind {
                SourceKind::Plain | SourceKind::Csv => match &source.url {
                    Some(u) if url::Url::parse(u).is_ok() => {}
                    Some(u) => {
                        return Err(ReconError::ConfigValidation(format!(
                            "source '{name}': invalid url '{u}'"
                        )))
                    }
                    None => {
                        return Err(ReconError::ConfigValidation(format!(
                            "source '{name}': kind '{}' requires url",
                            source.kind
                        )))
                    }
                },
                SourceKind::Search => {
                    if source.query.as_deref().map_or(true, |q| q.trim().is_empty()) {
                        return Err(ReconError::ConfigValidation(format!(
                            "source '{name}': kind 'search' requires query"
                        )));
                    }
                }
            }

            let range = source.range();
            if range.min == 0 || range.min > range.max {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{name}': invalid bound {range}"
                )));
            }

            source.extractor()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "test"

[fetch]
timeout_secs = 5

[search]
endpoint = "https://search.example/html/"
delay_secs = 3

[[sources]]
name = "list"
kind = "plain"
url = "https://lists.example/asn.txt"

[[sources]]
kind = "search"
query = "site:spur.us/context VPN"
"#;

    #[test]
    fn parse_valid() {
        let config = SweepConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert!(!config.fetch.insecure);
        assert_eq!(config.search.delay_secs, 3);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].display_name(), "search: site:spur.us/context VPN");
        assert_eq!(config.sources[0].range(), AsnRange::RAW);
        assert_eq!(config.sources[1].range(), AsnRange::SEARCH);
    }

    #[test]
    fn defaults_apply() {
        let config = SweepConfig::from_toml("").unwrap();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.search.delay_secs, 2);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn builtin_config_is_valid() {
        let config = SweepConfig::builtin().unwrap();
        let plain = config.sources.iter().filter(|s| s.kind != SourceKind::Search).count();
        let search = config.sources.iter().filter(|s| s.kind == SourceKind::Search).count();
        assert_eq!(plain, 5);
        assert_eq!(search, 15);
        assert_eq!(config.search.delay_secs, 2);
    }

    #[test]
    fn rejects_zero_search_delay() {
        let input = "[search]\ndelay_secs = 0\n";
        let err = SweepConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(ref m) if m.contains("delay_secs")), "{err}");

        let input = "[search]\ndelay_secs = 1\n";
        assert!(SweepConfig::from_toml(input).is_err());

        let input = "[search]\ndelay_secs = 2\n";
        assert_eq!(SweepConfig::from_toml(input).unwrap().search.delay_secs, 2);
    }

    #[test]
    fn bound_override() {
        let input = r#"
[[sources]]
name = "s"
kind = "search"
query = "q"
max_asn = 9999999
"#;
        let config = SweepConfig::from_toml(input).unwrap();
        assert_eq!(config.sources[0].range(), AsnRange { min: 1000, max: 9_999_999 });
    }

    #[test]
    fn rejects_missing_url() {
        let err = SweepConfig::from_toml("[[sources]]\nname = \"x\"\nkind = \"plain\"\n").unwrap_err();
        assert!(err.to_string().contains("requires url"), "{err}");
    }

    #[test]
    fn rejects_missing_query() {
        let err = SweepConfig::from_toml("[[sources]]\nname = \"x\"\nkind = \"search\"\n").unwrap_err();
        assert!(err.to_string().contains("requires query"), "{err}");
    }

    #[test]
    fn rejects_duplicate_names() {
        let input = r#"
[[sources]]
name = "x"
kind = "plain"
url = "https://a.example/"
[[sources]]
name = "x"
kind = "csv"
url = "https://b.example/"
"#;
        let err = SweepConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("duplicate source name 'x'"), "{err}");
    }

    #[test]
    fn rejects_inverted_bound() {
        let input = "[[sources]]\nname = \"x\"\nkind = \"plain\"\nurl = \"https://a.example/\"\nmin_asn = 5000\nmax_asn = 10\n";
        assert!(matches!(
            SweepConfig::from_toml(input).unwrap_err(),
            ReconError::ConfigValidation(_)
        ));
    }

    #[test]
    fn rejects_bad_pattern() {
        let input = "[[sources]]\nname = \"x\"\nkind = \"plain\"\nurl = \"https://a.example/\"\npattern = \"(\\\\d+\"\n";
        match SweepConfig::from_toml(input).unwrap_err() {
            ReconError::Pattern { source, .. } => assert_eq!(source, "x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = SweepConfig::from_toml("[[sources]]\nname = \"x\"\nkind = \"ftp\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(SweepConfig::from_toml("[fetch]\ntimeout_secs = 0\n").is_err());
    }
}
