//! Resolver configuration

use super::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network lookup page on the AQL portal
pub const DEFAULT_LOOKUP_URL: &str = "http://portal.aql.com/telecoms/network_lookup.php";

/// Query parameter carrying the number
pub const NUMBER_PARAM: &str = "number";

/// Fixed submit marker the portal expects alongside the number
pub const SUBMIT_PARAM: (&str, &str) = ("nlSubmit", "submit");

/// Configuration for a [`NetworkResolver`](super::NetworkResolver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Lookup page, without query string
    pub lookup_url: String,
    /// Outbound proxy used for every request
    pub proxy: Option<String>,
    /// Deadline for each request including the body (default: none)
    pub timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            proxy: None,
            timeout: None,
        }
    }
}

impl ResolverConfig {
    /// Create a new ResolverConfig builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if let Some(addr) = &self.proxy {
            if addr.trim().is_empty() {
                return Err(ConfigError::InvalidProxy {
                    addr: addr.clone(),
                    reason: "empty address".to_string(),
                });
            }
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidTimeout(
                "timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse the lookup URL
    pub(crate) fn endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: self.lookup_url.clone(),
            reason,
        };

        let url = Url::parse(&self.lookup_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_string()));
        }
        Ok(url)
    }
}

/// Builder for ResolverConfig
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Set the lookup page URL
    pub fn lookup_url(mut self, url: impl Into<String>) -> Self {
        self.config.lookup_url = url.into();
        self
    }

    /// Route requests through a proxy
    pub fn proxy(mut self, addr: impl Into<String>) -> Self {
        self.config.proxy = Some(addr.into());
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResolverConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
