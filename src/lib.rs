//! numlookup - Telecom network lookup for phone numbers
//!
//! This library reads number lists, queries the AQL network lookup portal
//! for each number and extracts the owning network from the returned page.

pub mod batch;
pub mod lookup;
pub mod numbers;

// Re-export core types for library users
pub use batch::{run_batch, BatchSummary};
pub use lookup::{
    ConfigError, LookupError, LookupErrorKind, LookupResult, Network, NetworkResolver, Resolve,
    ResolverConfig, ResolverConfigBuilder,
};
pub use numbers::{normalize, InputError, NumberQuery, NumberSource};
