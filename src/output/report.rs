//! Crawl report types
//!
//! A [`CrawlReport`] is what a finished crawl hands back: the statistics,
//! the pages in the order they were visited, and every failure.

use crate::output::stats::CrawlStatistics;
use crate::state::CrawlPhase;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One page or image that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// The URL that failed
    pub url: String,

    /// Error message
    pub message: String,
}

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Normalized seed URL
    pub seed: String,

    /// Authority the crawl was confined to
    pub domain: String,

    /// Directory images were written into
    pub image_dir: PathBuf,

    /// Phase the coordinator ended in
    pub phase: CrawlPhase,

    /// Pages in the order they were dequeued
    pub visit_order: Vec<String>,

    /// Pages whose fetch failed
    pub failed_pages: Vec<FailureRecord>,

    /// Images whose download failed, including unnamed ones
    pub failed_images: Vec<FailureRecord>,

    /// Counters
    pub stats: CrawlStatistics,
}

impl CrawlReport {
    /// Returns true if every page and every image succeeded
    pub fn is_clean(&self) -> bool {
        self.failed_pages.is_empty() && self.failed_images.is_empty()
    }
}
