// src/page/html.rs
// =============================================================================
// This module pulls the raw href values out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from broken markup the way a
//   browser does instead of failing
//
// Only <a> tags are looked at, and only their href attribute. The values
// are returned exactly as written in the page; turning them into absolute
// URLs is the job of links.rs.
// =============================================================================

use scraper::{Html, Selector};

// Returns the href of every <a> tag in document order.
//
// Broken or truncated markup never fails: html5ever repairs what it can and
// we return whatever anchors it recognized.
//
// Example:
//   html = "<a href='/docs'>Docs</a><img src='x.png'>"
//   result = ["/docs"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // The selector is a constant and known to be valid
    let selector = Selector::parse("a[href]").expect("static selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_anchor_hrefs() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a href="https://www.rust-lang.org">Rust</a>
            <link href="/style.css" rel="stylesheet">
            <img src="/logo.png">
            <a name="top">no href</a>
        "#;
        let hrefs = extract_hrefs(html);
        assert_eq!(hrefs, vec!["/docs", "https://www.rust-lang.org"]);
    }

    #[test]
    fn test_uppercase_tags() {
        let hrefs = extract_hrefs(r#"<A HREF="/upper">x</A>"#);
        assert_eq!(hrefs, vec!["/upper"]);
    }

    #[test]
    fn test_truncated_markup_keeps_earlier_links() {
        let hrefs = extract_hrefs(r#"<p><a href="/a">a</a><div><a href="/b"#);
        assert_eq!(hrefs, vec!["/a"]);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_hrefs("plain text, not even html").is_empty());
        assert!(extract_hrefs("").is_empty());
    }
}
