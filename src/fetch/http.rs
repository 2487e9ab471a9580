// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP.
//
// The crawl engine only sees the Transport trait, so tests can swap in an
// in-memory site. HttpTransport is the real implementation on top of
// reqwest:
// - one shared Client (connection pooling), cloned cheaply per task
// - a fixed per-request timeout (15 seconds unless configured otherwise)
// - follows up to 5 redirects
// - gives up as soon as the crawl is cancelled
//
// The transport does not judge status codes. It returns whatever the server
// answered and the engine decides that >= 400 is a failure.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{CrawlError, CrawlResult};

/// One response, as received
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl FetchedPage {
    /// The Content-Type header, or "" when missing or not valid text
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, cancel: &CancellationToken, url: &str) -> CrawlResult<FetchedPage>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("site-mirror/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, cancel: &CancellationToken, url: &str) -> CrawlResult<FetchedPage> {
        let download = async {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };

        let (status, headers, body) = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(CrawlError::Fetch {
                    url: url.to_string(),
                    reason: "crawl cancelled".to_string(),
                });
            }
            result = download => result.map_err(|e| categorize_error(url, e))?,
        };

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body: body.to_vec(),
            headers,
        })
    }
}

// Turns a reqwest error into a short, human readable reason
fn categorize_error(url: &str, error: reqwest::Error) -> CrawlError {
    let error_string = error.to_string();

    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "could not resolve hostname".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    CrawlError::Fetch {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_status_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=utf-8")
                    .set_body_bytes("<a href=\"/a\">a</a>"),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/index", server.uri());
        let page = transport
            .fetch(&CancellationToken::new(), &url)
            .await
            .unwrap();

        assert_eq!(page.url, url);
        assert_eq!(page.status, 200);
        assert_eq!(page.content_type(), "text/html; charset=utf-8");
        assert_eq!(page.body, b"<a href=\"/a\">a</a>");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_judged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let page = transport
            .fetch(&CancellationToken::new(), &format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.status, 404);
    }

    #[tokio::test]
    async fn test_timeout_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_millis(100)).unwrap();
        let err = transport
            .fetch(&CancellationToken::new(), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Fetch { ref reason, .. } if reason == "request timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_returns_early() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = transport.fetch(&cancel, &server.uri()).await.unwrap_err();
        assert!(matches!(err, CrawlError::Fetch { ref reason, .. } if reason == "crawl cancelled"));
    }
}
