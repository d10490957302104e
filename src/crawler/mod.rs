//! Crawler module for page fetching and image harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with typed failures
//! - HTML extraction of link and image references
//! - Image downloading into the output directory
//! - Job scheduling across a bounded worker pool
//! - Overall crawl coordination

mod coordinator;
mod downloader;
mod extractor;
mod fetcher;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use downloader::{image_filename, DownloadError, ImageDownloader, SavedImage};
pub use extractor::{ExtractedRefs, Extractor, HtmlExtractor};
pub use fetcher::{build_http_client, fetch_bytes, FetchError};
pub use scheduler::{Job, Scheduler};
