// src/page/decode.rs
// =============================================================================
// This module turns a raw response body into UTF-8 text we can parse.
//
// How the charset is chosen (first match wins):
// 1. A byte order mark at the start of the body
// 2. The charset parameter of the Content-Type header
// 3. A <meta charset> / <meta http-equiv> declaration near the top
// 4. Statistical detection over the whole body (chardetng)
//
// Media (image/*, video/*, audio/*, font/*) is never decoded: it cannot
// contain links, so we report SkippedMedia and move on.
//
// We decode strictly. A body that is malformed for its charset is a
// DecodeError, not a page full of replacement characters.
// =============================================================================

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::error::{CrawlError, CrawlResult};

// Top-level media types that never carry links
const MEDIA_TYPES: [&str; 4] = ["image", "video", "audio", "font"];

// How far into the body we look for a <meta> charset declaration
const META_PRESCAN_BYTES: usize = 1024;

/// Decodes `body` to UTF-8 according to its declared `content_type`.
///
/// `url` is only used to label errors.
pub fn decode_body(url: &str, body: &[u8], content_type: &str) -> CrawlResult<String> {
    let content_type = content_type.trim().to_ascii_lowercase();

    if is_media(&content_type) {
        return Err(CrawlError::SkippedMedia {
            url: url.to_string(),
            content_type,
        });
    }

    let (encoding, bom_len) = pick_encoding(url, body, &content_type)?;

    encoding
        .decode_without_bom_handling_and_without_replacement(&body[bom_len..])
        .map(|text| text.into_owned())
        .ok_or_else(|| CrawlError::Decode {
            url: url.to_string(),
            reason: format!("malformed {} byte stream", encoding.name()),
        })
}

// Returns the encoding to use and how many leading BOM bytes to skip
fn pick_encoding(
    url: &str,
    body: &[u8],
    content_type: &str,
) -> CrawlResult<(&'static Encoding, usize)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        return Ok((encoding, bom_len));
    }

    let label = charset_param(content_type).or_else(|| meta_charset(body));
    if let Some(label) = label {
        return Encoding::for_label(label.as_bytes())
            .map(|encoding| (encoding, 0))
            .ok_or_else(|| CrawlError::Decode {
                url: url.to_string(),
                reason: format!("unrecognized charset '{}'", label),
            });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    Ok((detector.guess(None, true), 0))
}

fn is_media(content_type: &str) -> bool {
    let top_level = content_type
        .split(['/', ';'])
        .next()
        .unwrap_or("")
        .trim();
    MEDIA_TYPES.contains(&top_level)
}

// Extracts the charset parameter from a Content-Type value, e.g.
// "text/html; charset=\"ISO-8859-1\"" -> Some("ISO-8859-1")
fn charset_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches(['"', '\'']).to_string())
        .filter(|value| !value.is_empty())
}

// A cheap prescan for `charset=` inside the first bytes of the document.
// Covers both <meta charset="x"> and <meta http-equiv content="...; charset=x">.
fn meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut search_from = 0;
    while let Some(offset) = head[search_from..].find("<meta") {
        let tag_start = search_from + offset;
        let tag_end = head[tag_start..]
            .find('>')
            .map(|end| tag_start + end)
            .unwrap_or(head.len());
        let tag = &head[tag_start..tag_end];

        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(['"', '\''])
                .chars()
                .take_while(|c| !matches!(c, '"' | '\'' | ';' | '/' | '>') && !c.is_whitespace())
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }

        search_from = tag_end;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let text = decode_body("http://x/", "<p>héllo</p>".as_bytes(), "text/html; charset=UTF-8")
            .unwrap();
        assert_eq!(text, "<p>héllo</p>");
    }

    #[test]
    fn test_declared_latin1_is_transcoded() {
        // 0xE9 is 'é' in ISO-8859-1 (windows-1252 under WHATWG)
        let body = b"<a href=\"/caf\xE9\">caf\xE9</a>";
        let text = decode_body("http://x/", body, "Text/HTML; Charset=\"ISO-8859-1\"").unwrap();
        assert_eq!(text, "<a href=\"/café\">café</a>");
    }

    #[test]
    fn test_media_is_skipped() {
        let err = decode_body("http://x/logo.png", b"\x89PNG", "image/png").unwrap_err();
        assert!(err.is_skip());

        for content_type in ["VIDEO/mp4", "audio/ogg", "font/woff2"] {
            assert!(decode_body("http://x/f", b"", content_type)
                .unwrap_err()
                .is_skip());
        }
    }

    #[test]
    fn test_unknown_charset_is_a_decode_error() {
        let err = decode_body("http://x/", b"hi", "text/html; charset=klingon").unwrap_err();
        assert!(matches!(err, CrawlError::Decode { .. }));
    }

    #[test]
    fn test_malformed_utf8_is_a_decode_error() {
        let err = decode_body("http://x/", b"ok \xFF\xFE broken", "text/html; charset=utf-8")
            .unwrap_err();
        assert!(matches!(err, CrawlError::Decode { .. }));
    }

    #[test]
    fn test_bom_wins_over_header() {
        let body = b"\xEF\xBB\xBF<p>bom</p>";
        let text = decode_body("http://x/", body, "text/html; charset=windows-1252").unwrap();
        assert_eq!(text, "<p>bom</p>");
    }

    #[test]
    fn test_meta_charset_is_sniffed() {
        let body = b"<html><head><meta charset=\"windows-1252\"></head><body>\x93hi\x94</body></html>";
        let text = decode_body("http://x/", body, "text/html").unwrap();
        assert!(text.contains("\u{201C}hi\u{201D}"));
    }

    #[test]
    fn test_http_equiv_charset_is_sniffed() {
        let body = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-1\">\xE9";
        let text = decode_body("http://x/", body, "").unwrap();
        assert!(text.ends_with('é'));
    }

    #[test]
    fn test_no_declaration_falls_back_to_detection() {
        let text = decode_body("http://x/", b"<a href=\"/a\">a</a>", "text/html").unwrap();
        assert_eq!(text, "<a href=\"/a\">a</a>");
    }

    #[test]
    fn test_charset_param_parsing() {
        assert_eq!(charset_param("text/html; charset=utf-8").as_deref(), Some("utf-8"));
        assert_eq!(charset_param("text/html;charset='koi8-r'").as_deref(), Some("koi8-r"));
        assert_eq!(charset_param("text/html"), None);
        assert_eq!(charset_param("text/html; charset="), None);
    }
}
