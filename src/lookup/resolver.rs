//! HTTP resolver for the network lookup portal

use super::config::{ResolverConfig, NUMBER_PARAM, SUBMIT_PARAM};
use super::error::{ConfigError, LookupError};
use super::scanner::NetworkScanner;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use tracing::{debug, instrument};

/// Outcome of a lookup that reached the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    /// Network name as shown by the portal
    Named(String),
    /// The page ended without a network entry
    NotFound,
}

impl Network {
    /// Text reported for numbers the portal has no network for
    pub const NOT_FOUND: &'static str = "not found";

    /// Network name, or the `not found` sentinel
    pub fn as_str(&self) -> &str {
        match self {
            Network::Named(name) => name,
            Network::NotFound => Self::NOT_FOUND,
        }
    }

    /// Whether the portal reported a network
    pub fn is_found(&self) -> bool {
        matches!(self, Network::Named(_))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving a single number
pub type LookupResult = Result<Network, LookupError>;

/// Resolves one number to its owning network
///
/// Implementations hold no per-call state, so independent calls may run
/// concurrently. Futures are not required to be `Send`; callers drive them
/// on a single task.
#[async_trait(?Send)]
pub trait Resolve {
    /// Look up the network for a normalized number
    async fn resolve(&self, number: &str) -> LookupResult;
}

/// Resolver backed by the portal's network lookup page
///
/// # Examples
///
/// ```no_run
/// use numlookup::{NetworkResolver, Resolve, ResolverConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let resolver = NetworkResolver::new(ResolverConfig::default())?;
///
///     let network = resolver.resolve("07700900123").await?;
///     println!("07700900123 - {network}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NetworkResolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl NetworkResolver {
    /// Build a resolver, including its HTTP client, from a configuration
    pub fn new(config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        // Only the configured proxy is used; HTTP_PROXY and friends are ignored
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(addr) = &config.proxy {
            let proxy =
                reqwest::Proxy::all(addr.as_str()).map_err(|e| ConfigError::InvalidProxy {
                    addr: addr.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.proxy(proxy);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// URL queried for a number
    pub fn lookup_url(&self, number: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(NUMBER_PARAM, number)
            .append_pair(SUBMIT_PARAM.0, SUBMIT_PARAM.1);
        url
    }
}

#[async_trait(?Send)]
impl Resolve for NetworkResolver {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, number: &str) -> LookupResult {
        let url = self.lookup_url(number);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::from_request(&e))?;
        debug!(status = %response.status(), "Received lookup response");

        let mut scanner = NetworkScanner::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if let Some(name) = scanner.feed(&chunk) {
                        // Remaining body is dropped with the response
                        return Ok(Network::Named(name));
                    }
                }
                Ok(None) => {
                    return Ok(scanner.finish().map_or(Network::NotFound, Network::Named));
                }
                Err(e) => return Err(LookupError::from_body(&e)),
            }
        }
    }
}
