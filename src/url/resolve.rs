use crate::UrlError;
use url::Url;

/// Parses and normalizes the crawl's seed URL
///
/// The seed is held to stricter rules than discovered references: it must
/// parse on its own, use HTTP or HTTPS, and carry a host, because it fixes
/// the domain for the whole session. Its fragment is dropped like any other
/// frontier entry.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::normalize_seed;
///
/// let seed = normalize_seed("http://Example.test/start#top").unwrap();
/// assert_eq!(seed.as_str(), "http://example.test/start");
/// ```
pub fn normalize_seed(seed: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_fetchable_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves a raw reference against the page it was found on
///
/// Standard relative-reference resolution is applied against `base`, then
/// the fragment is discarded so that `page#a` and `page#b` become the same
/// key.
///
/// Returns `None` when the reference is:
/// - empty or whitespace only
/// - unparseable relative to `base`
/// - not HTTP(S) after resolution (`mailto:`, `javascript:`, `data:`, ...)
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("http://example.test/gallery/index.html").unwrap();
///
/// let link = resolve_reference(&base, "../about#team").unwrap();
/// assert_eq!(link.as_str(), "http://example.test/about");
///
/// assert!(resolve_reference(&base, "").is_none());
/// assert!(resolve_reference(&base, "mailto:someone@example.test").is_none());
/// ```
pub fn resolve_reference(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut resolved = base.join(raw).ok()?;
    if !is_fetchable_scheme(&resolved) {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}

fn is_fetchable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
