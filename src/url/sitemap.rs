//! Sitemap XML parsing
//!
//! Extracts `<loc>` entries from `<urlset>` and `<sitemapindex>` documents in
//! the standard sitemap namespace.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

/// Namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors raised while parsing a sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Malformed sitemap XML: {0}")]
    Malformed(String),
}

/// Returns true if the URL points at another sitemap document
pub fn is_sitemap_url(url: &str) -> bool {
    url.ends_with(".xml")
}

/// Parses a sitemap document and returns its `<loc>` entries in document order
///
/// Only `loc` elements bound to [`SITEMAP_NAMESPACE`] are collected. Entry
/// text is trimmed and empty entries are skipped. Nested sitemap URLs are
/// returned like any other entry; use [`is_sitemap_url`] to tell them apart.
///
/// # Errors
///
/// Returns [`SitemapError::Malformed`] if the document is not well-formed
/// XML or has no root element.
///
/// # Example
///
/// ```
/// use docsync::url::parse_sitemap_xml;
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://example.com/a</loc></url>
/// </urlset>"#;
/// assert_eq!(parse_sitemap_xml(xml.as_bytes()).unwrap(), vec!["https://example.com/a"]);
/// ```
pub fn parse_sitemap_xml(xml: &[u8]) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut locs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut in_loc = false;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                depth += 1;
                saw_root = true;
                if is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    in_loc = true;
                    current.clear();
                }
            }
            Ok((_, Event::Empty(_))) => {
                saw_root = true;
            }
            Ok((_, Event::End(_))) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SitemapError::Malformed("unexpected closing tag".to_string()))?;
                if in_loc {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Ok((_, Event::Text(text))) => {
                if in_loc {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| SitemapError::Malformed(e.to_string()))?;
                    current.push_str(&unescaped);
                }
            }
            Ok((_, Event::CData(data))) => {
                if in_loc {
                    current.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(SitemapError::Malformed(e.to_string())),
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SitemapError::Malformed("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(SitemapError::Malformed(format!(
            "{} unclosed element(s) at end of document",
            depth
        )));
    }

    Ok(locs)
}

fn is_sitemap_loc(ns: &ResolveResult, local_name: &[u8]) -> bool {
    local_name == b"loc"
        && matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE.as_bytes())
}
