//! Network lookup against the telecom portal
//!
//! A [`NetworkResolver`] issues one GET per number and scrapes the network
//! name out of the returned page with a [`NetworkScanner`].

pub mod config;
pub mod error;
pub mod resolver;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_server;

pub use config::{ResolverConfig, ResolverConfigBuilder, DEFAULT_LOOKUP_URL};
pub use error::{ConfigError, LookupError, LookupErrorKind};
pub use resolver::{LookupResult, Network, NetworkResolver, Resolve};
pub use scanner::NetworkScanner;
