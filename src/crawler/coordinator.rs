//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns all mutable crawl state: the frontier (through the
//! scheduler), the visited-page set and the downloaded-image set. Workers
//! spawned on a `JoinSet` only fetch, extract and download; their outcomes
//! come back here and are applied one at a time, so every "is this URL new"
//! decision is a single check-and-insert with no other writer.

use crate::config::{validate, Config};
use crate::crawler::downloader::{DownloadError, ImageDownloader, SavedImage};
use crate::crawler::extractor::{ExtractedRefs, Extractor, HtmlExtractor};
use crate::crawler::fetcher::{build_http_client, fetch_bytes, FetchError};
use crate::crawler::scheduler::{Job, Scheduler};
use crate::output::{CrawlReport, CrawlStatistics, FailureRecord};
use crate::state::{CrawlPhase, QueuedPage, SeenSet};
use crate::url::{authority, is_same_domain, normalize_seed, resolve_reference};
use crate::{HarvestError, UrlError};
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Progress is logged every this many completed pages
const PROGRESS_INTERVAL: u64 = 10;

/// What a worker hands back to the coordinator
#[derive(Debug)]
enum TaskOutcome {
    Page {
        page: QueuedPage,
        result: Result<ExtractedRefs, FetchError>,
    },
    Image {
        url: Url,
        result: Result<SavedImage, DownloadError>,
    },
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    extractor: Arc<dyn Extractor>,
    downloader: Arc<ImageDownloader>,
    scheduler: Scheduler,
    visited: SeenSet,
    downloaded: SeenSet,
    seed: Url,
    domain: String,
    phase: CrawlPhase,
    visit_order: Vec<String>,
    failed_pages: Vec<FailureRecord>,
    failed_images: Vec<FailureRecord>,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator using the `scraper`-backed extractor
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, frontier seeded, phase `Idle`
    /// * `Err(HarvestError)` - Invalid config, bad seed, or the image
    ///   directory could not be created
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        Self::with_extractor(config, Arc::new(HtmlExtractor))
    }

    /// Creates a new coordinator with a custom extractor
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let seed = normalize_seed(&config.crawler.seed_url)?;
        let domain = authority(&seed).ok_or(UrlError::MissingHost)?;

        // Without a destination there is nothing to harvest into
        let image_dir = config.output.image_dir.clone();
        std::fs::create_dir_all(&image_dir).map_err(|source| HarvestError::OutputDir {
            path: image_dir.clone(),
            source,
        })?;

        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        let downloader = Arc::new(ImageDownloader::new(client.clone(), image_dir));

        let mut scheduler = Scheduler::new(config.crawler.max_concurrent_fetches as usize);
        scheduler.enqueue_page(QueuedPage {
            url: seed.clone(),
            depth: 0,
        });

        tracing::debug!(
            "Coordinator ready: seed={}, domain={}, workers={}",
            seed,
            domain,
            scheduler.max_in_flight()
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            extractor,
            downloader,
            scheduler,
            visited: SeenSet::new(),
            downloaded: SeenSet::new(),
            seed,
            domain,
            phase: CrawlPhase::Idle,
            visit_order: Vec::new(),
            failed_pages: Vec::new(),
            failed_images: Vec::new(),
            stats: CrawlStatistics::default(),
        })
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// Loop:
    /// 1. Fill free worker slots from the scheduler (images before pages)
    /// 2. Wait for one worker to finish
    /// 3. Apply its outcome: queue new images and in-domain links
    /// 4. Stop when nothing is queued and nothing is in flight
    ///
    /// Page and image failures are logged and counted, never returned. The
    /// only errors are phase misuse, such as running a coordinator twice.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        self.transition(CrawlPhase::Running)?;
        self.stats.started_at = Some(Utc::now());

        tracing::info!(
            "Starting harvest of {} into {}",
            self.seed,
            self.downloader.dest_dir().display()
        );

        let start_time = Instant::now();
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
        let mut pages_completed: u64 = 0;

        loop {
            while let Some(job) = self.scheduler.next_job(tasks.len()) {
                self.dispatch(job, &mut tasks);
            }

            let Some(joined) = tasks.join_next().await else {
                // An idle pool gets work from next_job whenever any is queued
                debug_assert!(self.scheduler.is_drained());
                break;
            };

            match joined {
                Ok(TaskOutcome::Page { page, result }) => {
                    self.scheduler.page_finished(page.depth);
                    self.handle_page_outcome(page, result);
                    pages_completed += 1;

                    if pages_completed % PROGRESS_INTERVAL == 0 {
                        let rate = pages_completed as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages crawled, {} in frontier, {} images pending, {} images downloaded, {:.2} pages/sec",
                            pages_completed,
                            self.scheduler.frontier_size(),
                            self.scheduler.pending_images(),
                            self.stats.images_downloaded,
                            rate
                        );
                    }
                }
                Ok(TaskOutcome::Image { url, result }) => {
                    self.handle_image_outcome(url, result);
                }
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                }
            }
        }

        self.transition(CrawlPhase::Done)?;
        self.stats.finished_at = Some(Utc::now());

        tracing::info!(
            "Scraping complete: {} pages visited ({} ok), {} images downloaded in {:?}",
            self.stats.pages_visited,
            self.stats.pages_succeeded(),
            self.stats.images_downloaded,
            start_time.elapsed()
        );

        Ok(self.report())
    }

    /// Current phase of the session
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Authority every followed link must match
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Pages dequeued so far
    pub fn visited(&self) -> &SeenSet {
        &self.visited
    }

    /// Image URLs submitted for download so far
    pub fn downloaded_images(&self) -> &SeenSet {
        &self.downloaded
    }

    /// Pages waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.scheduler.frontier_size()
    }

    /// Counters collected so far
    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Snapshot of the session as a report
    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            seed: self.seed.to_string(),
            domain: self.domain.clone(),
            image_dir: self.config.output.image_dir.clone(),
            phase: self.phase,
            visit_order: self.visit_order.clone(),
            failed_pages: self.failed_pages.clone(),
            failed_images: self.failed_images.clone(),
            stats: self.stats.clone(),
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Hands a job to a new worker task
    fn dispatch(&mut self, job: Job, tasks: &mut JoinSet<TaskOutcome>) {
        match job {
            Job::Page(page) => {
                // Enqueue-time checks already prevent this; it stays cheap
                if !self.visited.insert(&page.url) {
                    tracing::debug!("Skipping already visited page: {}", page.url);
                    self.scheduler.page_finished(page.depth);
                    return;
                }

                tracing::info!("Scraping page: {}", page.url);
                self.visit_order.push(page.url.to_string());
                self.stats.pages_visited += 1;
                self.stats.max_depth_reached = self.stats.max_depth_reached.max(page.depth);

                let client = self.client.clone();
                let extractor = Arc::clone(&self.extractor);
                tasks.spawn(async move {
                    let result = match fetch_bytes(&client, &page.url).await {
                        Ok(body) => {
                            Ok(extract_off_runtime(extractor, body, page.url.clone()).await)
                        }
                        Err(e) => Err(e),
                    };
                    TaskOutcome::Page { page, result }
                });
            }
            Job::Image(url) => {
                let downloader = Arc::clone(&self.downloader);
                tasks.spawn(async move {
                    let result = downloader.download(&url).await;
                    TaskOutcome::Image { url, result }
                });
            }
        }
    }

    fn handle_page_outcome(&mut self, page: QueuedPage, result: Result<ExtractedRefs, FetchError>) {
        match result {
            Ok(refs) => self.handle_discovered_refs(&page, &refs),
            Err(e) => {
                tracing::warn!("Failed to retrieve {}: {}", page.url, e);
                self.stats.pages_failed += 1;
                self.failed_pages.push(FailureRecord {
                    url: page.url.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Queues new images and in-domain links found on a page
    ///
    /// Images are resolved and deduplicated but never domain-filtered.
    /// Links are resolved, domain-filtered, checked against both the visited
    /// set and the frontier, and depth-capped.
    fn handle_discovered_refs(&mut self, page: &QueuedPage, refs: &ExtractedRefs) {
        if refs.is_empty() {
            tracing::debug!("No links or images on {}", page.url);
            return;
        }

        for raw in refs.images() {
            let Some(image_url) = resolve_reference(&page.url, raw) else {
                tracing::debug!("Ignoring image reference {:?} on {}", raw, page.url);
                continue;
            };

            if self.downloaded.insert(&image_url) {
                self.stats.images_submitted += 1;
                self.scheduler.enqueue_image(image_url);
            } else {
                tracing::trace!("Image already submitted: {}", image_url);
            }
        }

        let next_depth = page.depth + 1;
        for raw in refs.links() {
            let Some(link) = resolve_reference(&page.url, raw) else {
                tracing::debug!("Ignoring link reference {:?} on {}", raw, page.url);
                continue;
            };

            if !is_same_domain(&link, &self.domain) {
                tracing::debug!("Skipping off-domain link: {}", link);
                self.stats.links_off_domain += 1;
                continue;
            }

            if self.visited.contains(&link) || self.scheduler.is_page_queued(&link) {
                continue;
            }

            if self
                .config
                .crawler
                .max_depth
                .is_some_and(|max| next_depth > max)
            {
                tracing::debug!("Skipping {} beyond max depth", link);
                self.stats.links_beyond_depth += 1;
                continue;
            }

            self.scheduler.enqueue_page(QueuedPage {
                url: link,
                depth: next_depth,
            });
        }
    }

    fn handle_image_outcome(&mut self, url: Url, result: Result<SavedImage, DownloadError>) {
        match result {
            Ok(saved) => {
                tracing::info!("Downloaded {} -> {}", url, saved.path.display());
                self.stats.images_downloaded += 1;
                self.stats.bytes_written += saved.bytes;
            }
            Err(e) => {
                match &e {
                    DownloadError::EmptyFilename { .. } => {
                        tracing::warn!("Skipping image without filename: {}", url);
                        self.stats.images_unnamed += 1;
                    }
                    _ => {
                        tracing::warn!("Failed to download {}: {}", url, e);
                        self.stats.images_failed += 1;
                    }
                }
                self.failed_images.push(FailureRecord {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Parses a page body on the blocking pool
///
/// HTML parsing is CPU-bound and would otherwise stall a runtime thread for
/// the length of a large document.
async fn extract_off_runtime(
    extractor: Arc<dyn Extractor>,
    body: Vec<u8>,
    url: Url,
) -> ExtractedRefs {
    let page_url = url.clone();
    match tokio::task::spawn_blocking(move || extractor.extract(&body, &url)).await {
        Ok(refs) => refs,
        Err(e) => {
            tracing::error!("Extraction failed for {}: {}", page_url, e);
            ExtractedRefs::default()
        }
    }
}

/// Runs a complete crawl with the default extractor
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::Config;
/// use sumi_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::new("http://www.rembrandtpainting.net/", "raw_dataset/Rembrandt");
/// let report = run_crawl(config).await?;
/// println!("{} images saved", report.stats.images_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
