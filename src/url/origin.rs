use crate::{UrlError, UrlResult};
use url::Url;

/// Reduces a URL to its origin: `scheme://host[:port]`
///
/// # Reduction Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject URLs without a host (`mailto:`, `data:` and friends)
/// 3. Keep the scheme and host as lowercased by the parser
/// 4. Keep the port only when it differs from the scheme's default
/// 5. Drop credentials, path, query and fragment
///
/// # Arguments
///
/// * `url_str` - The URL string to reduce
///
/// # Returns
///
/// * `Ok(String)` - The origin of the URL
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use crawl_ledger::url::origin_of;
///
/// let origin = origin_of("http://Evil.COM/path?q=1#top").unwrap();
/// assert_eq!(origin, "http://evil.com");
///
/// let origin = origin_of("https://example.com:8443/a").unwrap();
/// assert_eq!(origin, "https://example.com:8443");
/// ```
pub fn origin_of(url_str: &str) -> UrlResult<String> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(url_str.to_string()))?;

    let origin = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    Ok(origin)
}
