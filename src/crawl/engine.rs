// src/crawl/engine.rs
// =============================================================================
// This module runs a crawl from a single seed URL.
//
// How it works:
// 1. The seed is claimed in the visited registry, then fetched, decoded and
//    scanned for links right away, before any concurrency starts
// 2. Every link the registry accepts as new goes onto the discovery queue
// 3. The dispatch loop takes URLs off the queue and spawns one task per URL;
//    each task does the same fetch -> decode -> extract -> claim -> enqueue
//    -> save sequence as the seed did
// 4. The crawl is done when no task is running and the queue is empty
//
// Cancellation stops the dispatch loop at once. Tasks that already started
// fetching are detached and left to finish (or fail) on their own; tasks
// still waiting for a fetch permit give up without fetching.
//
// A page that fails (bad status, network error, undecodable body) is logged
// and skipped; it never stops the rest of the crawl.
//
// Rust concepts:
// - Arc: shares the run's state (registry, queue, counters) between tasks
// - JoinSet: owns the spawned tasks; its length is the outstanding count
// - tokio::select!: waits on several things at once, first one wins
// =============================================================================

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::registry::VisitedRegistry;
use crate::error::{CrawlError, CrawlResult};
use crate::fetch::{PageStore, Transport};
use crate::page::{decode_body, discover_links};

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    Idle,
    /// Processing the seed
    Running,
    /// Dispatching discovered URLs
    Draining,
    /// Nothing in flight and nothing queued
    Done,
    /// The dispatch loop was stopped by the cancellation signal
    Cancelled,
}

/// Summary of a finished run, printed at the end (optionally as JSON)
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub state: CrawlState,
    pub pages_fetched: usize,
    pub pages_saved: usize,
    pub pages_skipped: usize,
    pub pages_failed: usize,
    /// Every URL claimed during the run, sorted
    pub visited: Vec<String>,
}

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicUsize,
    saved: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// Everything one crawl run shares between its tasks
struct RunContext {
    transport: Arc<dyn Transport>,
    store: Arc<dyn PageStore>,
    registry: Arc<VisitedRegistry>,
    queue: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    permits: Semaphore,
    counters: Counters,
}

pub struct Crawler {
    transport: Arc<dyn Transport>,
    store: Arc<dyn PageStore>,
    concurrency: usize,
}

impl Crawler {
    /// `concurrency` caps how many pages are fetched at once (minimum 1)
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn PageStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            transport,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Crawls everything reachable from `seed` on the same site.
    ///
    /// Returns an error only when the seed itself is unusable; per-page
    /// failures are logged and counted in the report.
    pub async fn run(&self, seed: &str, cancel: CancellationToken) -> CrawlResult<CrawlReport> {
        // Canonical form, the same spelling the link filter produces, so
        // "http://x" and a link to "http://x/" are one page
        let canonical_seed = validate_seed(seed)?;
        let seed = canonical_seed.as_str();

        let mut state = CrawlState::Idle;
        debug!(?state, seed, "crawl created");

        let (queue, mut discovered) = mpsc::unbounded_channel();
        let registry = Arc::new(VisitedRegistry::new());
        let ctx = Arc::new(RunContext {
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
            registry: Arc::clone(&registry),
            queue,
            cancel: cancel.clone(),
            permits: Semaphore::new(self.concurrency),
            counters: Counters::default(),
        });

        // The seed is claimed before it is fetched so a page linking back
        // to it can never schedule it a second time
        state = CrawlState::Running;
        info!(?state, seed, "starting crawl");
        registry.register(seed);
        visit(Arc::clone(&ctx), seed.to_string()).await;

        state = CrawlState::Draining;
        debug!(?state, "seed processed, dispatching discovered links");

        let mut tasks = JoinSet::new();
        state = loop {
            if cancel.is_cancelled() {
                break CrawlState::Cancelled;
            }

            if tasks.is_empty() {
                // Nothing in flight: whatever is queued now is all the work left
                match discovered.try_recv() {
                    Ok(url) => {
                        tasks.spawn(visit(Arc::clone(&ctx), url));
                        continue;
                    }
                    Err(_) => break CrawlState::Done,
                }
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break CrawlState::Cancelled,
                Some(url) = discovered.recv() => {
                    tasks.spawn(visit(Arc::clone(&ctx), url));
                }
                Some(joined) = tasks.join_next() => {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            std::panic::resume_unwind(err.into_panic());
                        }
                    }
                }
            }
        };

        if state == CrawlState::Cancelled {
            let in_flight = tasks.len();
            tasks.detach_all();
            info!(
                in_flight,
                claimed = registry.len(),
                "crawl cancelled, letting in-flight pages finish"
            );
        }

        let counters = &ctx.counters;
        let report = CrawlReport {
            seed: seed.to_string(),
            state,
            pages_fetched: counters.fetched.load(Ordering::Relaxed),
            pages_saved: counters.saved.load(Ordering::Relaxed),
            pages_skipped: counters.skipped.load(Ordering::Relaxed),
            pages_failed: counters.failed.load(Ordering::Relaxed),
            visited: registry.snapshot(),
        };

        info!(
            state = ?report.state,
            visited = report.visited.len(),
            fetched = report.pages_fetched,
            failed = report.pages_failed,
            "crawl finished"
        );

        Ok(report)
    }
}

fn validate_seed(seed: &str) -> CrawlResult<String> {
    let invalid = |reason: String| CrawlError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let mut url = Url::parse(seed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL has no host".to_string()));
    }

    url.set_fragment(None);
    Ok(url.to_string())
}

// One unit of work: crawl a single URL and record how it went
async fn visit(ctx: Arc<RunContext>, url: String) {
    // acquire() only errors on a closed semaphore; this one is never closed
    let Ok(_permit) = ctx.permits.acquire().await else {
        return;
    };
    // Dispatched before the cancel but still waiting for a permit: drop it
    if ctx.cancel.is_cancelled() {
        debug!(url = %url, "crawl cancelled before fetch started");
        return;
    }

    match crawl_page(&ctx, &url).await {
        Ok(new_links) => {
            info!(url = %url, new_links, "page crawled");
        }
        Err(err) if err.is_skip() => {
            Counters::bump(&ctx.counters.skipped);
            debug!(url = %url, "{}", err);
        }
        Err(err @ CrawlError::Persist { .. }) => {
            warn!(url = %url, error = %err, "page crawled but not saved");
        }
        Err(err) => {
            Counters::bump(&ctx.counters.failed);
            warn!(url = %url, error = %err, "page failed");
        }
    }
}

// fetch -> decode -> extract -> claim -> enqueue -> save.
// Returns how many new URLs this page contributed.
async fn crawl_page(ctx: &RunContext, url: &str) -> CrawlResult<usize> {
    let page = ctx.transport.fetch(&ctx.cancel, url).await?;
    if page.status >= 400 {
        return Err(CrawlError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", page.status),
        });
    }
    Counters::bump(&ctx.counters.fetched);

    let html = decode_body(&page.url, &page.body, page.content_type())?;

    let mut new_links = 0;
    for link in discover_links(url, &html) {
        if ctx.registry.register(&link) {
            debug!(from = %url, link = %link, "discovered");
            // The receiver is gone once the crawl was cancelled; the link
            // stays claimed but is never dispatched
            if ctx.queue.send(link).is_ok() {
                new_links += 1;
            }
        }
    }

    ctx.store.save(url, html.as_bytes()).await?;
    Counters::bump(&ctx.counters.saved);

    Ok(new_links)
}
