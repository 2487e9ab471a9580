// src/crawl/registry.rs
// =============================================================================
// The visited registry: every URL that has been claimed for crawling.
//
// It is the only state shared between crawl tasks. There is exactly one
// operation that matters, `register`, which checks and inserts under a
// single lock. Splitting that into "contains?" then "insert" would let two
// tasks both see a URL as new and both fetch it.
//
// One registry lives for one crawl run and is shared through an Arc.
// Entries are never removed.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`. Returns true only for the one caller that inserted it.
    pub fn register(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// All claimed URLs, sorted
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().iter().cloned().collect();
        urls.sort();
        urls
    }

    // A panic while holding the lock can't leave the set half-updated,
    // so a poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_once() {
        let registry = VisitedRegistry::new();
        assert!(registry.register("http://x/a"));
        assert!(!registry.register("http://x/a"));
        assert!(registry.register("http://x/b"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot(), vec!["http://x/a", "http://x/b"]);
    }

    #[test]
    fn test_exact_string_identity() {
        let registry = VisitedRegistry::new();
        assert!(registry.register("http://x/a"));
        assert!(registry.register("http://x/a/"));
        assert!(registry.register("http://x/A"));
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(VisitedRegistry::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| registry.register(&format!("http://x/{}", i)))
                        .count()
                })
            })
            .collect();

        let wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(wins, 100);
        assert_eq!(registry.len(), 100);
    }
}
