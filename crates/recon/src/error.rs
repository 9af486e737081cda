use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate source, bad bound, etc.).
    ConfigValidation(String),
    /// Extraction pattern failed to compile.
    Pattern { source: String, message: String },
    /// Canonical list could not be interpreted.
    CanonicalParse(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Pattern { source, message } => {
                write!(f, "source '{source}': invalid extraction pattern: {message}")
            }
            Self::CanonicalParse(msg) => write!(f, "canonical list error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// Failure reported by a [`crate::engine::Fetch`] implementation.
///
/// Always recovered inside the pipeline; never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request exceeded its timeout and was abandoned.
    Timeout,
    /// Upstream answered with a non-2xx status.
    Status(u16),
    /// Connection, TLS, or body read failure.
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
