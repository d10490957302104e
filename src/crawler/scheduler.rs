//! Scheduler for dispatching page and image jobs
//!
//! This module handles:
//! - The FIFO page frontier
//! - The queue of image downloads waiting for a worker
//! - The global cap on jobs in flight
//! - Level-by-level page dispatch
//!
//! Image jobs always go out before page jobs. With a single worker this
//! makes the crawl strictly sequential: a page's images are downloaded
//! before the next page is fetched.
//!
//! With more workers, a page is only handed out while no shallower page is
//! still being fetched. Every link of depth `d` is therefore discovered
//! before any page of depth `d + 1` runs, so a page is always tagged with
//! its shortest distance from the seed.

use crate::state::{Frontier, QueuedPage};
use std::collections::{BTreeMap, VecDeque};
use url::Url;

/// A unit of work handed to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Fetch a page and extract its references
    Page(QueuedPage),

    /// Download an image into the output directory
    Image(Url),
}

/// Scheduler owns the pending work of a crawl session
///
/// It never decides whether a URL is new; the coordinator does that against
/// its seen sets before anything is queued here.
#[derive(Debug)]
pub struct Scheduler {
    /// Pages waiting to be fetched, breadth-first
    frontier: Frontier,

    /// Images waiting to be downloaded, in discovery order
    images: VecDeque<Url>,

    /// Maximum number of jobs running at once
    max_in_flight: usize,

    /// Pages handed out and not yet finished, counted per depth
    pages_in_flight: BTreeMap<u32, usize>,
}

impl Scheduler {
    /// Creates a scheduler with an empty frontier
    ///
    /// `max_in_flight` is clamped to at least one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            frontier: Frontier::new(),
            images: VecDeque::new(),
            max_in_flight: max_in_flight.max(1),
            pages_in_flight: BTreeMap::new(),
        }
    }

    /// Adds a page to the back of the frontier
    ///
    /// Returns `false` if the URL was already queued.
    pub fn enqueue_page(&mut self, page: QueuedPage) -> bool {
        self.frontier.push(page)
    }

    /// Adds an image download to the back of the image queue
    pub fn enqueue_image(&mut self, url: Url) {
        self.images.push_back(url);
    }

    /// Returns true if the page URL is waiting in the frontier
    pub fn is_page_queued(&self, url: &Url) -> bool {
        self.frontier.contains(url)
    }

    /// Returns the next job if a worker slot is free
    ///
    /// # Arguments
    ///
    /// * `in_flight` - Number of jobs currently running
    ///
    /// # Returns
    ///
    /// * `Some(Job)` - Pending image first, otherwise the oldest page
    /// * `None` - Every slot is busy, nothing is queued, or the oldest page
    ///   is deeper than a page still in flight
    ///
    /// Every page returned here must be reported back through
    /// [`Scheduler::page_finished`].
    pub fn next_job(&mut self, in_flight: usize) -> Option<Job> {
        if in_flight >= self.max_in_flight {
            return None;
        }

        if let Some(url) = self.images.pop_front() {
            return Some(Job::Image(url));
        }

        // Nothing running means nothing can still be counted as running
        if in_flight == 0 {
            self.pages_in_flight.clear();
        }

        let next_depth = self.frontier.peek()?.depth;
        if let Some(shallowest) = self.shallowest_in_flight() {
            if next_depth > shallowest {
                return None;
            }
        }

        let page = self.frontier.pop()?;
        *self.pages_in_flight.entry(page.depth).or_insert(0) += 1;
        Some(Job::Page(page))
    }

    /// Marks a page handed out by `next_job` as finished
    pub fn page_finished(&mut self, depth: u32) {
        if let Some(count) = self.pages_in_flight.get_mut(&depth) {
            *count -= 1;
            if *count == 0 {
                self.pages_in_flight.remove(&depth);
            }
        }
    }

    /// Depth of the shallowest page still being fetched
    pub fn shallowest_in_flight(&self) -> Option<u32> {
        self.pages_in_flight.keys().next().copied()
    }

    /// Number of pages waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Number of images waiting for a worker
    pub fn pending_images(&self) -> usize {
        self.images.len()
    }

    /// Returns true if no page or image is waiting
    pub fn is_drained(&self) -> bool {
        self.frontier.is_empty() && self.images.is_empty()
    }

    /// Maximum number of jobs running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}
