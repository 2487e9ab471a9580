// src/fetch/mod.rs
// =============================================================================
// The crawler's two collaborators with the outside world.
//
// Submodules:
// - http: the Transport trait and its reqwest implementation
// - store: the PageStore trait, the on-disk mirror and a no-op store
//
// The crawl engine depends on the traits only, which is what lets its tests
// run against an in-memory website.
// =============================================================================

mod http;
mod store;

pub use http::{FetchedPage, HttpTransport, Transport};
pub use store::{FsPageStore, NullStore, PageStore};
