// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Usage:
//   site-mirror https://example.com
//   site-mirror https://example.com --output-dir ./out --concurrency 8
//   site-mirror https://example.com --no-save --json
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT, DEFAULT_OUTPUT_DIR};

// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Crawl a single website and mirror every page it links to",
    long_about = "site-mirror starts at one URL, follows every link that stays on the same site, \
                  fetches each page exactly once and writes it to disk. \
                  Press Ctrl-C to stop early; pages already being downloaded still finish."
)]
pub struct Cli {
    /// Seed URL to start crawling from (e.g., https://example.com)
    ///
    /// This is a positional argument (required, no flag needed)
    pub url: String,

    /// Directory the mirrored pages are written to
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum number of pages downloaded at the same time
    #[arg(long, short = 'c', default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Crawl without writing any pages to disk
    #[arg(long)]
    pub no_save: bool,

    /// Print the final report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            output_dir: self.output_dir.clone(),
            concurrency: self.concurrency.max(1),
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            save_pages: !self.no_save,
        }
    }
}
