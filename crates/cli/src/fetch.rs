//! HTTP fetch capability backed by a blocking `reqwest` client.
//!
//! One attempt per request: a failed source is retried by re-running the
//! tool, not inside a run.

use std::time::Duration;

use asnsweep_recon::engine::{Fetch, FetchRequest};
use asnsweep_recon::FetchError;

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const MAX_RESPONSE_BYTES: usize = 20 * 1024 * 1024; // 20 MB

// ── HttpFetcher ─────────────────────────────────────────────────────

pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// `insecure` turns off certificate verification for every request.
    pub fn new(user_agent: &str, timeout: Duration, insecure: bool) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;
        Ok(Self { http })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let mut req = self.http.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let resp = req.send().map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().map_err(classify)?;
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::Transport(format!(
                "response body of {} bytes exceeds the {} byte limit",
                body.len(),
                MAX_RESPONSE_BYTES
            )));
        }
        Ok(body.to_vec())
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}
