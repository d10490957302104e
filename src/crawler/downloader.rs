//! Image downloader
//!
//! Saves one image URL into the output directory, named after the last
//! segment of the URL path.

use crate::crawler::fetcher::{fetch_bytes, FetchError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use url::Url;

/// Failure of a single image download
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No filename in image URL {url}")]
    EmptyFilename { url: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Full path of the written file
    pub path: PathBuf,

    /// Number of bytes written
    pub bytes: u64,
}

/// Suffix source for in-progress files, unique within the process
static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Derives the on-disk filename for an image URL
///
/// Returns the last path segment as written in the URL, or `None` when the
/// path ends in `/` or has no segments.
///
/// # Examples
///
/// ```
/// use sumi_harvest::crawler::image_filename;
/// use url::Url;
///
/// let url = Url::parse("http://cdn.test/paintings/night-watch.jpg?w=800").unwrap();
/// assert_eq!(image_filename(&url), Some("night-watch.jpg".to_string()));
///
/// let url = Url::parse("http://cdn.test/paintings/").unwrap();
/// assert_eq!(image_filename(&url), None);
/// ```
pub fn image_filename(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Writes images into a fixed destination directory
///
/// The directory must already exist; the coordinator creates it before the
/// crawl starts. A file with the same name is overwritten.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    dest_dir: PathBuf,
}

impl ImageDownloader {
    /// Creates a downloader writing into `dest_dir`
    pub fn new(client: Client, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dest_dir: dest_dir.into(),
        }
    }

    /// The directory images are written into
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Downloads one image
    ///
    /// The filename is derived before any request is made, so a URL without
    /// one costs no network traffic.
    pub async fn download(&self, url: &Url) -> Result<SavedImage, DownloadError> {
        let filename = image_filename(url).ok_or_else(|| DownloadError::EmptyFilename {
            url: url.to_string(),
        })?;

        let body = fetch_bytes(&self.client, url).await?;

        let path = self.dest_dir.join(&filename);
        write_replacing(&self.dest_dir, &filename, &path, &body).await?;

        Ok(SavedImage {
            path,
            bytes: body.len() as u64,
        })
    }
}

/// Writes `body` to `path` through a hidden sibling file and a rename
///
/// Two images sharing a filename may finish at the same time; the rename
/// leaves one complete file rather than interleaved writes.
async fn write_replacing(
    dir: &Path,
    filename: &str,
    path: &Path,
    body: &[u8],
) -> Result<(), DownloadError> {
    let part = dir.join(format!(
        ".{}.{}-{}.part",
        filename,
        std::process::id(),
        PART_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(source) = tokio::fs::write(&part, body).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(DownloadError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(source) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(DownloadError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
