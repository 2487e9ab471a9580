// src/error.rs
// =============================================================================
// Error kinds a single page can run into while it is being crawled.
//
// Every one of these is local to the task that produced it: the task logs
// the error and ends, the rest of the crawl keeps going. Only InvalidSeed
// stops the program before the crawl starts.
//
// Rust concepts:
// - thiserror: derives Display and std::error::Error from the attributes
// - Enums with data: each variant carries the URL it is about
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The transport failed or the server answered with status >= 400
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The body's charset is unknown or the bytes are malformed for it
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Images, video, audio and fonts are skipped on purpose
    #[error("skipped {url}: {content_type} is not a page")]
    SkippedMedia { url: String, content_type: String },

    /// The page store could not write the page
    #[error("failed to save {url}: {source}")]
    Persist {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The seed URL cannot start a crawl
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
}

impl CrawlError {
    /// SkippedMedia is an intentional outcome, not a failure
    pub fn is_skip(&self) -> bool {
        matches!(self, CrawlError::SkippedMedia { .. })
    }
}

pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_media_is_not_a_failure() {
        let skip = CrawlError::SkippedMedia {
            url: "http://x/logo.png".to_string(),
            content_type: "image/png".to_string(),
        };
        assert!(skip.is_skip());

        let fetch = CrawlError::Fetch {
            url: "http://x/".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(!fetch.is_skip());
        assert_eq!(fetch.to_string(), "failed to fetch http://x/: HTTP 404");
    }
}
