// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and a Ctrl-C / SIGTERM handler
// 3. Crawl the site, mirroring pages to disk as they arrive
// 4. Print a summary and exit (0 = crawl ran, 2 = could not start)
//
// Failed pages are not an exit-code matter: they show up in the log and in
// the summary, but a crawl that ran is a successful run.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;     // src/cli.rs - command-line parsing
mod config;  // src/config.rs - runtime settings
mod crawl;   // src/crawl/ - the crawl engine and visited registry
mod error;   // src/error.rs - per-page error kinds
mod fetch;   // src/fetch/ - HTTP transport and page storage
mod logging; // src/logging.rs - tracing setup
mod page;    // src/page/ - decoding, link extraction and filtering

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cli::Cli;
use crawl::{CrawlReport, Crawler};
use fetch::{FsPageStore, HttpTransport, NullStore, PageStore};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = cli.crawl_config();

    let transport = HttpTransport::new(config.fetch_timeout)
        .context("failed to create HTTP client")?;
    let store: Arc<dyn PageStore> = if config.save_pages {
        info!(dir = %config.output_dir.display(), "mirroring pages");
        Arc::new(FsPageStore::new(config.output_dir.clone()))
    } else {
        Arc::new(NullStore)
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let crawler = Crawler::new(Arc::new(transport), store, config.concurrency);
    let report = crawler.run(&cli.url, cancel).await?;

    print_report(&report, cli.json)
}

// Cancels the crawl on the first Ctrl-C (or SIGTERM on Unix)
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted by Ctrl-C"),
        _ = terminate => info!("interrupted by SIGTERM"),
    }

    cancel.cancel();
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("📊 Crawl of {} ({:?})", report.seed, report.state);
    println!("   🔗 Discovered: {}", report.visited.len());
    println!("   📄 Fetched:    {}", report.pages_fetched);
    println!("   💾 Saved:      {}", report.pages_saved);
    println!("   ⏭️  Skipped:    {}", report.pages_skipped);
    println!("   ❌ Failed:     {}", report.pages_failed);
    Ok(())
}
