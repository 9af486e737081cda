use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::adapter::{adapt, SourceKind};
use crate::config::{SourceConfig, SweepConfig};
use crate::curated::CuratedTable;
use crate::error::{FetchError, ReconError};
use crate::extract::decode_lossy;
use crate::model::{CanonicalSet, ReconciliationResult, SourceContribution};
use crate::reconcile::reconcile;

// ---------------------------------------------------------------------------
// Fetch capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

/// Transport supplied by the caller. Implementations must give up once
/// `request.timeout` has elapsed and report [`FetchError::Timeout`].
pub trait Fetch {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(request)
    }
}

/// Search endpoint URL with `query` as the literal `q` parameter.
pub fn search_url(endpoint: &str, query: &str) -> Result<String, ReconError> {
    url::Url::parse_with_params(endpoint, &[("q", query)])
        .map(String::from)
        .map_err(|e| ReconError::ConfigValidation(format!("search endpoint '{endpoint}': {e}")))
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// Minimum spacing between consecutive requests to the same host.
#[derive(Debug, Default)]
pub struct Throttle {
    last: HashMap<String, Instant>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `interval` has passed since the last request to `host` finished.
    pub fn wait(&self, host: &str, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        if let Some(prev) = self.last.get(host) {
            let elapsed = prev.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    }

    pub fn record(&mut self, host: &str) {
        self.last.insert(host.to_string(), Instant::now());
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Fetch every configured source in order, then reconcile with the curated
/// table as the highest-precedence source.
///
/// Per-source failures are logged and contribute nothing; the only errors
/// returned are configuration errors.
pub fn run(
    config: &SweepConfig,
    canonical: &CanonicalSet,
    curated: &CuratedTable,
    fetcher: &dyn Fetch,
) -> Result<ReconciliationResult, ReconError> {
    let mut contributions = vec![curated.contribution()];
    contributions.extend(collect_sources(config, canonical, fetcher)?);
    Ok(reconcile(canonical, &contributions))
}

/// Sequential fetch + adapt of the configured sources, in listing order.
pub fn collect_sources(
    config: &SweepConfig,
    canonical: &CanonicalSet,
    fetcher: &dyn Fetch,
) -> Result<Vec<SourceContribution>, ReconError> {
    let mut throttle = Throttle::new();
    let mut out = Vec::with_capacity(config.sources.len());

    for source in &config.sources {
        let name = source.display_name();
        let extractor = source.extractor()?;
        let url = request_url(config, source)?;
        let host = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let interval = match source.kind {
            SourceKind::Search => Duration::from_secs(config.search.delay_secs),
            SourceKind::Plain | SourceKind::Csv => Duration::ZERO,
        };

        throttle.wait(&host, interval);
        debug!(source = %name, %url, "fetching");
        let request = FetchRequest {
            url,
            headers: vec![("User-Agent".to_string(), config.fetch.user_agent.clone())],
            timeout: Duration::from_secs(config.fetch.timeout_secs),
        };
        let fetched = fetcher.fetch(&request);
        throttle.record(&host);

        match fetched {
            Ok(bytes) => {
                let text = decode_lossy(&bytes);
                let records = adapt(source.kind, &name, &text, &extractor);
                let missing = records.iter().filter(|r| !canonical.contains(r.asn)).count();
                info!(source = %name, found = records.len(), missing, "source scanned");
                out.push(SourceContribution::fetched(name, records));
            }
            Err(e) => {
                warn!(source = %name, error = %e, "fetch failed, skipping source");
                out.push(SourceContribution::failed(name, e.to_string()));
            }
        }
    }

    Ok(out)
}

fn request_url(config: &SweepConfig, source: &SourceConfig) -> Result<String, ReconError> {
    match source.kind {
        SourceKind::Search => {
            let query = source.query.as_deref().unwrap_or_default();
            search_url(&config.search.endpoint, query)
        }
        SourceKind::Plain | SourceKind::Csv => source.url.clone().ok_or_else(|| {
            ReconError::ConfigValidation(format!("source '{}' has no url", source.display_name()))
        }),
    }
}
