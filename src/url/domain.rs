use url::Url;

/// Extracts the network authority (host plus explicit port) from a URL
///
/// The host is lowercased. A port is only included when the URL spells out
/// a non-default one, so `https://example.com:443/` and `https://example.com/`
/// share an authority.
///
/// # Arguments
///
/// * `url` - The URL to extract the authority from
///
/// # Returns
///
/// * `Some(String)` - The lowercase authority
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docsync::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
