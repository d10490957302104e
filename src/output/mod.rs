//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Counting what a crawl did (`CrawlStatistics`)
//! - Printing the end-of-run summary to the terminal
//! - Writing the optional markdown report

mod markdown;
pub mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{CrawlReport, FailureRecord, OutputError, OutputResult};
pub use stats::{print_statistics, CrawlStatistics};
