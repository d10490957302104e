use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPage {
    /// Resolved, fragment-free page URL
    pub url: Url,

    /// Breadth-first depth; the seed is 0
    pub depth: u32,
}

/// FIFO queue of pages discovered but not yet fetched
///
/// The frontier rejects a URL that is already queued, so together with the
/// visited set it guarantees a page is never scheduled twice. Entries leave
/// in insertion order, which gives breadth-first traversal.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueuedPage>,

    /// Keys of every URL currently in `queue`
    queued: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page unless the same URL is already queued
    ///
    /// Returns `true` if the page was added.
    pub fn push(&mut self, page: QueuedPage) -> bool {
        if !self.queued.insert(page.url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(page);
        true
    }

    /// Removes and returns the oldest queued page
    pub fn pop(&mut self) -> Option<QueuedPage> {
        let page = self.queue.pop_front()?;
        self.queued.remove(page.url.as_str());
        Some(page)
    }

    /// The page `pop` would return next
    pub fn peek(&self) -> Option<&QueuedPage> {
        self.queue.front()
    }

    /// Returns true if the URL is waiting in the frontier
    pub fn contains(&self, url: &Url) -> bool {
        self.queued.contains(url.as_str())
    }

    /// Number of queued pages
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
