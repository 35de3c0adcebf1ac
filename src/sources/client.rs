//! Shared HTTP client construction
//!
//! Both remote sources build their `reqwest` client the same way; the
//! defaults live here so timeouts and identification stay uniform.

use std::time::Duration;

use reqwest::Client;

use crate::utils::error::{Result, ScanError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build an HTTP client with the given request timeout.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(ScanError::from)
}

/// Validate that `url` parses and uses an http(s) scheme.
pub(crate) fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| ScanError::validation(format!("Invalid URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScanError::validation(format!(
            "Unsupported URL scheme '{}' in '{}'",
            other, url
        ))),
    }
}
