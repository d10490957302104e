use url::Url;

/// Returns the network authority (`host[:port]`) of a URL
///
/// The host is lowercased and the port only appears when it is not the
/// scheme's default, so `http://Example.test:80/` and `http://example.test/`
/// share an authority. Userinfo is never part of the result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::authority;
///
/// let url = Url::parse("http://EXAMPLE.test/path").unwrap();
/// assert_eq!(authority(&url), Some("example.test".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks whether a resolved URL belongs to the crawl's domain
///
/// The authority must match exactly; subdomains are different domains and
/// the scheme is not compared.
///
/// # Arguments
///
/// * `url` - The resolved link
/// * `domain` - The session domain, as produced by [`authority`] on the seed
pub fn is_same_domain(url: &Url, domain: &str) -> bool {
    authority(url).is_some_and(|candidate| candidate.eq_ignore_ascii_case(domain))
}
