//! HTML parsing for page metadata

use scraper::{Html, Selector};

/// Extracts the text of the page's `<title>` element
///
/// Whitespace is trimmed; an empty title counts as missing.
///
/// # Example
///
/// ```
/// use docsync::crawler::extract_title;
///
/// let html = r#"<html><head><title>Test</title></head><body></body></html>"#;
/// assert_eq!(extract_title(html), Some("Test".to_string()));
/// ```
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_empty_title() {
        let html = r#"<html><head><title>   </title></head><body></body></html>"#;
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_first_title_wins() {
        let html = r#"<html><head><title>One</title></head><body><svg><title>Two</title></svg></body></html>"#;
        assert_eq!(extract_title(html), Some("One".to_string()));
    }

    #[test]
    fn test_not_html() {
        assert_eq!(extract_title("plain text body"), None);
    }
}
