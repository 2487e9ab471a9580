// src/crawl/mod.rs
// =============================================================================
// This module handles crawling a website.
//
// Features:
// - Concurrent crawling: one task per discovered page, capped by a semaphore
// - Same-site only: links to other hosts are never followed
// - Every page is fetched at most once, no matter how often it is linked
// - Stops cleanly on Ctrl-C / SIGTERM
//
// Submodules:
// - registry: the visited set shared by all tasks
// - engine: the crawl loop itself
// =============================================================================

mod engine;
mod registry;

pub use engine::{CrawlReport, CrawlState, Crawler};
