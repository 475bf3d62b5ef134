//! wikihop CLI - concurrent Wikipedia link-path search
//!
//! Crawls the live article graph to find a chain of hyperlinks connecting
//! a start page to a target page, then prints the path, its length and the
//! elapsed wall-clock time.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use wikihop::rate_limit::SpacedRateLimiter;
use wikihop::search::{PathSearch, DEFAULT_MAX_CONCURRENT_FETCHES};
use wikihop::source::ArticleSource;

/// Find a chain of article links connecting two Wikipedia pages
#[derive(Parser)]
#[command(name = "wikihop")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find a chain of article links connecting two Wikipedia pages", long_about = None)]
struct Cli {
    /// Title of the article to start from
    start: String,

    /// Title of the article to reach
    end: String,

    /// Log every article as it is explored
    #[arg(short, long)]
    verbose: bool,

    /// Personal API token for Wikipedia; raises the request budget from 500
    /// to 5000 per hour
    /// (<https://api.wikimedia.org/wiki/Authentication#Personal_API_tokens>)
    #[arg(short = 't', long, value_name = "TOKEN")]
    access_token: Option<String>,

    /// Maximum number of simultaneous fetches (0 = unbounded)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    max_fetches: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "wikihop=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let mut builder = ArticleSource::builder();
    if let Some(token) = &cli.access_token {
        builder = builder.access_token(token);
    }
    let source = builder.build();

    let limiter = SpacedRateLimiter::per_hour(source.requests_per_hour());
    tracing::debug!(
        budget_per_hour = source.requests_per_hour(),
        interval = ?limiter.interval(),
        "request spacing configured"
    );

    let search = PathSearch::builder(source)
        .rate_limiter(limiter)
        .max_concurrent_fetches(cli.max_fetches)
        .build();

    let started = Instant::now();
    let found = search.find_path(&cli.start, &cli.end).await?;
    let elapsed = started.elapsed();

    println!("Path: {found}");
    println!("Length: {}", found.hops());
    println!("Took {elapsed:.2?}");

    Ok(())
}
