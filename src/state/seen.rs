use std::collections::HashSet;
use url::Url;

/// Set of URLs already claimed in this session
///
/// Used for both the visited-page set and the downloaded-image set.
/// [`SeenSet::insert`] is the single check-and-claim step: callers act on a
/// URL only when it returns `true`.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL, returning `true` if it was not already present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    /// Returns true if the URL has been claimed
    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns true if nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
