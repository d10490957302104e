//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the session lifecycle (`Idle -> Running -> Done`)
//! - `Frontier`: FIFO queue of pages waiting to be fetched
//! - `SeenSet`: claim-once set behind the visited pages and downloaded images

mod frontier;
mod phase;
mod seen;

// Re-export main types
pub use frontier::{Frontier, QueuedPage};
pub use phase::CrawlPhase;
pub use seen::SeenSet;
