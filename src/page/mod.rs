// src/page/mod.rs
// =============================================================================
// Everything that happens to a fetched body before its links are scheduled.
//
// Submodules:
// - decode: raw bytes + Content-Type -> UTF-8 text (or SkippedMedia)
// - html: UTF-8 text -> raw href values
// - links: raw href -> absolute same-site URL, or rejected
// =============================================================================

mod decode;
mod html;
mod links;

pub use decode::decode_body;
pub use html::extract_hrefs;
pub use links::normalize_link;

/// Extracts every crawlable same-site link from a decoded page, in document
/// order. Duplicates are kept; the visited registry settles them.
pub fn discover_links(page_url: &str, html: &str) -> Vec<String> {
    extract_hrefs(html)
        .iter()
        .filter_map(|href| normalize_link(page_url, href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_links_on_seed_page() {
        let html = r##"
            <a href="/a">A</a>
            <a href="/a">A again</a>
            <a href="http://x/a">A, absolute</a>
            <a href="#signin">Sign in</a>
            <a href="b.pdf">PDF</a>
            <a href="http://other.com/c">Elsewhere</a>
        "##;
        let links = discover_links("http://x/", html);
        assert_eq!(links, vec!["http://x/a", "http://x/a", "http://x/a"]);
    }
}
