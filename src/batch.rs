//! Batch lookups over a number source
//!
//! Numbers are resolved one after another by default. With a concurrency
//! above one, up to that many independent lookups are in flight at once;
//! results are still delivered in input order.

use crate::lookup::{LookupResult, Resolve};
use crate::numbers::{InputError, NumberQuery};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counts of lookup outcomes for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Numbers looked up
    pub total: usize,
    /// Numbers the portal reported a network for
    pub found: usize,
    /// Numbers the portal had no network for
    pub not_found: usize,
    /// Lookups that failed with a transport or parse error
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &LookupResult) {
        self.total += 1;
        match result {
            Ok(network) if network.is_found() => self.found += 1,
            Ok(_) => self.not_found += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Resolve every number from `numbers`, reporting each result to `on_result`
///
/// `concurrency` of 0 or 1 resolves strictly sequentially. Per-number
/// failures are passed to `on_result` and never stop the batch; an input
/// error ends the batch after the numbers read before it have been
/// reported.
pub async fn run_batch<R, I, F>(
    resolver: &R,
    numbers: I,
    concurrency: usize,
    mut on_result: F,
) -> Result<BatchSummary, InputError>
where
    R: Resolve + ?Sized,
    I: IntoIterator<Item = Result<NumberQuery, InputError>>,
    F: FnMut(&str, &LookupResult),
{
    let width = concurrency.max(1);
    info!(concurrency = width, "Starting batch lookup");

    let mut summary = BatchSummary::default();
    let mut input_error = None;
    {
        let queries = numbers.into_iter().map_while(|item| match item {
            Ok(number) => Some(number),
            Err(e) => {
                input_error = Some(e);
                None
            }
        });

        let mut results = std::pin::pin!(stream::iter(queries)
            .map(|number| async move {
                let result = resolver.resolve(&number).await;
                (number, result)
            })
            .buffered(width));

        while let Some((number, result)) = results.next().await {
            match &result {
                Ok(network) => debug!(%number, %network, "Lookup complete"),
                Err(e) => debug!(%number, error = %e, "Lookup failed"),
            }
            summary.record(&result);
            on_result(&number, &result);
        }
    }

    if let Some(e) = input_error {
        warn!(error = %e, processed = summary.total, "Number list ended early");
        return Err(e);
    }

    info!(
        total = summary.total,
        found = summary.found,
        not_found = summary.not_found,
        failed = summary.failed,
        "Batch lookup finished"
    );
    Ok(summary)
}
