//! Statistics collected while a crawl runs

use chrono::{DateTime, Utc};

/// Crawl statistics summary
///
/// Reference counters (`links_off_domain`, `links_beyond_depth`) count
/// occurrences, so a link present on many pages is counted once per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Pages dequeued and fetched, successfully or not
    pub pages_visited: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Distinct image URLs handed to the downloader
    pub images_submitted: u64,

    /// Images written to disk
    pub images_downloaded: u64,

    /// Images whose fetch or write failed
    pub images_failed: u64,

    /// Images skipped because their URL path has no filename
    pub images_unnamed: u64,

    /// Link references rejected by the domain filter
    pub links_off_domain: u64,

    /// Link references not queued because of the depth cap
    pub links_beyond_depth: u64,

    /// Deepest breadth-first level fetched
    pub max_depth_reached: u32,

    /// Total bytes of image data written
    pub bytes_written: u64,

    /// When the crawl entered `Running`
    pub started_at: Option<DateTime<Utc>>,

    /// When the crawl reached `Done`
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    /// Pages fetched without error
    pub fn pages_succeeded(&self) -> u64 {
        self.pages_visited.saturating_sub(self.pages_failed)
    }

    /// Wall-clock duration of the crawl, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }

    /// Percentage of submitted images that reached disk
    pub fn image_success_rate(&self) -> f64 {
        if self.images_submitted == 0 {
            0.0
        } else {
            (self.images_downloaded as f64 / self.images_submitted as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Succeeded: {}", stats.pages_succeeded());
    println!("  Failed: {}", stats.pages_failed);
    println!("  Deepest level: {}", stats.max_depth_reached);
    println!();

    println!("Images:");
    println!("  Submitted: {}", stats.images_submitted);
    println!("  Downloaded: {}", stats.images_downloaded);
    println!("  Failed: {}", stats.images_failed);
    println!("  Skipped (no filename): {}", stats.images_unnamed);
    println!("  Bytes written: {}", stats.bytes_written);
    println!();

    println!("Links skipped:");
    println!("  Off domain: {}", stats.links_off_domain);
    println!("  Beyond max depth: {}", stats.links_beyond_depth);
    println!();

    if let Some(duration) = stats.duration_seconds() {
        println!("Duration: {}s", duration);
    }

    println!(
        "Image Success Rate: {:.1}% ({} / {} images downloaded)",
        stats.image_success_rate(),
        stats.images_downloaded,
        stats.images_submitted
    );
}
