//! Error types for network lookups

use serde::Serialize;
use thiserror::Error;

/// Broad classification of a failed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupErrorKind {
    /// The portal could not be reached or did not answer in time
    Transport,
    /// The response body failed part way through
    Parse,
}

/// Errors that can occur while resolving a single number
///
/// All of these are recoverable: the batch moves on to the next number.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Request or body read exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Response body could not be read to completion
    #[error("Failed to read response: {0}")]
    Parse(String),
}

impl LookupError {
    /// Classify this error
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            LookupError::Timeout | LookupError::Transport(_) => LookupErrorKind::Transport,
            LookupError::Parse(_) => LookupErrorKind::Parse,
        }
    }

    /// Map a failed request to a lookup error
    pub(crate) fn from_request(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(describe(e))
        }
    }

    /// Map a failed body read to a lookup error
    pub(crate) fn from_body(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Parse(describe(e))
        }
    }
}

/// Render an error with its source chain, `a: b: c`
fn describe(e: &(dyn std::error::Error + 'static)) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

/// Errors raised while building a resolver
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Lookup endpoint is not a usable URL
    #[error("Invalid lookup URL {url}: {reason}")]
    InvalidEndpoint {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Proxy address could not be parsed
    #[error("Invalid proxy address {addr}: {reason}")]
    InvalidProxy {
        /// The rejected proxy address
        addr: String,
        /// Why it was rejected
        reason: String,
    },

    /// Timeout value is unusable
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
