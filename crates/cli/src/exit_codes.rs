//! CLI Exit Code Registry
//!
//! Single source of truth for `asnsweep` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Description                                      |
//! |------|--------------------------------------------------|
//! | 0    | Success (including runs where sources failed)    |
//! | 1    | General error (unspecified)                      |
//! | 2    | CLI usage error (bad args, reported by clap)     |
//! | 3    | Canonical list missing or unparsable             |
//! | 4    | Invalid config or curated table                  |
//! | 5    | Cannot write report                              |
//!
//! An unreachable source never changes the exit code: it is reported in
//! the output and the run completes with 0.

/// Success - run completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Canonical list could not be read or holds no `AS<n>` lines.
pub const EXIT_CANONICAL: u8 = 3;

/// Source config or curated table failed to parse or validate.
pub const EXIT_CONFIG: u8 = 4;

/// Report could not be written to stdout.
pub const EXIT_OUTPUT: u8 = 5;
