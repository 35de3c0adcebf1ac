//! Scan configuration
//!
//! Typed configuration for a permission scan: which sites to resolve and
//! how to reach the remote membership endpoints. Access tokens are
//! injected at source construction and never appear in the config file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sources::client::validate_url;
use crate::sources::{GraphDirectorySource, SharePointRestSource};
use crate::utils::error::{Result, ScanError};

const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Absolute URLs of the sites to resolve.
    pub sites: Vec<String>,
    /// Remote endpoint settings.
    pub endpoints: EndpointConfig,
    /// HTTP client settings shared by both sources.
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the directory API.
    pub graph_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ScanConfig {
    /// Load and validate configuration from a YAML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScanError::config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ScanError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        debug!(sites = config.sites.len(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for site in &self.sites {
            validate_url(site)
                .map_err(|e| ScanError::config(format!("Invalid site URL: {}", e)))?;
        }
        validate_url(&self.endpoints.graph_base_url)
            .map_err(|e| ScanError::config(format!("Invalid graph base URL: {}", e)))?;
        if self.http.timeout_secs == 0 {
            return Err(ScanError::config("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Build a directory source from these settings and a bearer token.
    pub fn graph_source(&self, access_token: impl Into<String>) -> Result<GraphDirectorySource> {
        GraphDirectorySource::with_options(
            access_token,
            &self.endpoints.graph_base_url,
            self.http.timeout_secs,
        )
    }

    /// Build a site group source from these settings and a bearer token.
    pub fn sharepoint_source(
        &self,
        access_token: impl Into<String>,
    ) -> Result<SharePointRestSource> {
        SharePointRestSource::with_timeout(access_token, self.http.timeout_secs)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ScanError::config(format!("Failed to serialize config: {}", e)))
    }
}
