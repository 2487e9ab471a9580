// src/page/links.rs
// =============================================================================
// This module decides which hrefs are worth crawling.
//
// Given the URL of the page an href was found on, a link is either turned
// into an absolute URL on the same site, or rejected.
//
// Rejected:
// - fragment-only links (#search, #signin, ...)
// - the bare root path "/"
// - links to non-page resources (.pdf and friends)
// - links to another host, scheme or port
// - relative links without a leading slash ("about.html", "../x")
// - links that point back at the page they were found on
//
// Accepted:
// - absolute URLs on the same origin
// - absolute paths ("/docs"), resolved against the page's origin
//
// Accepted links come back in the url crate's serialization, so
// "HTTP://X:80/a#top" and "/a" are the same string: "http://x/a".
//
// Rust concepts:
// - Option<T>: None means "don't follow this link"
// - url::Url::origin(): scheme + host + port, compared structurally
// =============================================================================

use url::Url;

// Resources that are never HTML pages
const DENIED_EXTENSIONS: [&str; 6] = [".pdf", ".zip", ".gz", ".tar", ".exe", ".dmg"];

/// Turns `link` (found on the page at `page_url`) into an absolute same-site
/// URL, or returns None if it should not be crawled.
///
/// Applying it again to a URL it returned gives back the same URL.
pub fn normalize_link(page_url: &str, link: &str) -> Option<String> {
    let link = link.trim();
    if is_denied(link) {
        return None;
    }

    let base = Url::parse(page_url).ok()?;

    // Absolute paths resolve against the page; only fully qualified links
    // are parsed on their own. Relative paths ("about.html") never get here
    // as a Url, they fail to parse without a base.
    let mut candidate = if link.starts_with('/') {
        base.join(link).ok()?
    } else {
        Url::parse(link).ok()?
    };
    if candidate.origin() != base.origin() {
        return None;
    }

    // One spelling per page: the parser lowercases scheme and host, drops
    // default ports and percent-encodes the path; "#part" names the same page
    candidate.set_fragment(None);
    let absolute = candidate.to_string();

    // No self loops
    if absolute.eq_ignore_ascii_case(page_url) || absolute.eq_ignore_ascii_case(base.as_str()) {
        return None;
    }

    Some(absolute)
}

// Filters that don't need the page URL at all
fn is_denied(link: &str) -> bool {
    if link.is_empty() || link.starts_with('#') || link == "/" {
        return true;
    }

    // Check the path part only: "/report.pdf?download=1" is still a pdf
    let path = link
        .split(['?', '#'])
        .next()
        .unwrap_or(link)
        .to_ascii_lowercase();
    DENIED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
