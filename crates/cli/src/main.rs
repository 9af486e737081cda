// asnsweep - find ASNs missing from the canonical blocklist
// Output is advisory: nothing is written back to the list.

mod exit_codes;
mod fetch;

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use asnsweep_recon::canonical::load_canonical;
use asnsweep_recon::report::{render_text, JsonReport};
use asnsweep_recon::{CanonicalSet, CuratedTable, SweepConfig};

use exit_codes::{EXIT_CANONICAL, EXIT_CONFIG, EXIT_OUTPUT, EXIT_SUCCESS};
use fetch::HttpFetcher;

#[derive(Parser)]
#[command(name = "asnsweep")]
#[command(about = "Find ASNs that public sources list but the canonical blocklist lacks")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  asnsweep
  asnsweep --canonical ../all.txt
  asnsweep --config sources.toml --json > missing.json
  asnsweep --offline
  RUST_LOG=debug asnsweep --insecure")]
struct Cli {
    /// Canonical blocklist (lines starting with AS<number>)
    #[arg(long, env = "ASNSWEEP_CANONICAL", default_value = "all.txt")]
    canonical: PathBuf,

    /// Source list TOML (default: built-in list)
    #[arg(long, env = "ASNSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Curated table TOML (default: built-in table)
    #[arg(long)]
    curated: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Only consult the curated table, fetch nothing
    #[arg(long)]
    offline: bool,

    /// Emit a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Only log warnings on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("ASNSWEEP_BUILD_COMMIT"), ")",
        "\nengine:  asnsweep-recon ", env!("CARGO_PKG_VERSION"),
        "\ncurated: ", env!("ASNSWEEP_CURATED_UPDATED"),
        "\ntarget:  ", env!("ASNSWEEP_BUILD_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cmd_run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(cli.config.as_deref())?;
    let canonical = read_canonical(&cli.canonical)?;
    let curated = load_curated(cli.curated.as_deref())?;

    info!(
        canonical = canonical.len(),
        curated = curated.len(),
        sources = config.sources.len(),
        "loaded"
    );

    if cli.offline {
        config.sources.clear();
    }

    let insecure = cli.insecure || config.fetch.insecure;
    if insecure && !config.sources.is_empty() {
        warn!("TLS certificate verification disabled");
    }

    let fetcher = HttpFetcher::new(
        &config.fetch.user_agent,
        Duration::from_secs(config.fetch.timeout_secs),
        insecure,
    )?;

    let result = asnsweep_recon::run(&config, &canonical, &curated, &fetcher)
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    let rendered = if cli.json {
        let mut json = serde_json::to_string_pretty(&JsonReport::new(&result, &curated))
            .map_err(|e| CliError::new(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;
        json.push('\n');
        json
    } else {
        render_text(&result)
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(rendered.as_bytes())
        .and_then(|()| handle.flush())
        .map_err(|e| CliError::new(EXIT_OUTPUT, format!("cannot write report: {e}")))
}

fn load_config(path: Option<&Path>) -> Result<SweepConfig, CliError> {
    let Some(path) = path else {
        return SweepConfig::builtin().map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()));
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    SweepConfig::from_toml(&text)
        .map_err(|e| CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display())))
}

fn load_curated(path: Option<&Path>) -> Result<CuratedTable, CliError> {
    let Some(path) = path else {
        return CuratedTable::builtin().map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()));
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read curated table {}: {e}", path.display()))
    })?;
    CuratedTable::from_toml(&text)
        .map_err(|e| CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display())))
}

/// Missing or unparsable canonical list is fatal: without it every known
/// ASN would be reported as new.
fn read_canonical(path: &Path) -> Result<CanonicalSet, CliError> {
    let bytes = std::fs::read(path).map_err(|e| {
        CliError::new(
            EXIT_CANONICAL,
            format!("cannot read canonical list {}: {e}", path.display()),
        )
        .with_hint("run from the blocklist directory or pass --canonical <path>")
    })?;
    load_canonical(&bytes)
        .map_err(|e| CliError::new(EXIT_CANONICAL, format!("{}: {e}", path.display())))
}
