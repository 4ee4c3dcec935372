//! numlookup - Look up the telecom network that owns each number in a list.
//!
//! This is the command-line interface for the numlookup library.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;
use numlookup::lookup::DEFAULT_LOOKUP_URL;
use numlookup::{
    run_batch, ConfigError, LookupErrorKind, LookupResult, NetworkResolver, NumberSource,
    ResolverConfig,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Get the version string for numlookup
fn get_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(env!("CARGO_PKG_VERSION"), "-UNRELEASED")
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

/// Command-line arguments for the lookup tool.
#[derive(Parser, Debug)]
#[clap(author, version = get_version(), about = "Look up the telecom network of phone numbers", long_about = None)]
struct Args {
    /// Location of number list, one number per line
    #[clap(short, long)]
    input: PathBuf,

    /// Proxy address to use for lookups (e.g., 127.0.0.1:3128)
    #[clap(long)]
    proxy: Option<String>,

    /// Number of lookups to run at once (0 or 1 = one at a time)
    #[clap(short, long, default_value_t = 0)]
    concurrent: usize,

    /// Timeout for each lookup in milliseconds (0 = no timeout)
    #[clap(long, default_value_t = 0)]
    timeout_ms: u64,

    /// Network lookup page to query
    #[clap(long, default_value = DEFAULT_LOOKUP_URL)]
    lookup_url: String,

    /// Output results as JSON, one object per line
    #[clap(long)]
    json: bool,

    /// Enable verbose logging on stderr (repeat for more detail)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// JSON output record for a single number
#[derive(Debug, serde::Serialize)]
struct JsonResult<'a> {
    number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<LookupErrorKind>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Lookups share one thread; concurrency comes from interleaving requests
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = runtime.block_on(async_main(args));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("numlookup={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn async_main(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    // Input problems are fatal before any lookup is attempted
    let numbers = NumberSource::open(&args.input)?;
    let resolver = NetworkResolver::new(config)?;

    if !args.json {
        println!("Starting number lookup");
    }

    let json = args.json;
    let summary = run_batch(&resolver, numbers, args.concurrent, |number, result| {
        if json {
            println!("{}", format_json(number, result));
        } else {
            println!("{}", format_result(number, result));
        }
    })
    .await?;

    info!(
        total = summary.total,
        failed = summary.failed,
        "Finished number lookup"
    );
    Ok(())
}

/// Translate command-line options into a resolver configuration
fn build_config(args: &Args) -> Result<ResolverConfig, ConfigError> {
    let mut builder = ResolverConfig::builder().lookup_url(&args.lookup_url);

    if let Some(proxy) = args.proxy.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(proxy);
    }
    if args.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(args.timeout_ms));
    }

    builder.build()
}

/// Format one result as a text line
fn format_result(number: &str, result: &LookupResult) -> String {
    match result {
        Ok(network) => format!("{} - {}", number, network),
        Err(e) => format!("Unable to lookup network for {} : {}", number, e),
    }
}

/// Format one result as a JSON line
fn format_json(number: &str, result: &LookupResult) -> String {
    let record = match result {
        Ok(network) => JsonResult {
            number,
            network: Some(network.as_str()),
            error: None,
            kind: None,
        },
        Err(e) => JsonResult {
            number,
            network: None,
            error: Some(e.to_string()),
            kind: Some(e.kind()),
        },
    };

    serde_json::to_string(&record).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}
