// src/config.rs
// =============================================================================
// Runtime settings for one crawl.
//
// CrawlConfig is built from the command line in main.rs. The clap defaults
// in cli.rs come from the constants below, so a bare command line and
// CrawlConfig::default() describe the same crawl.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// Where pages go when no --output-dir is given
pub const DEFAULT_OUTPUT_DIR: &str = "mirror";

/// Per-request timeout used by the HTTP transport
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// How many pages may be downloaded at the same time
pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Where mirrored pages are written
    pub output_dir: PathBuf,
    /// Upper bound on in-flight fetches (at least 1)
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    /// When false, pages are crawled but not written anywhere
    pub save_pages: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            save_pages: true,
        }
    }
}
