//! Sequential image downloader.
//!
//! Fetches each URL in order through a [`Fetch`] implementation, saves the
//! body under the target directory, and records the outcome in a
//! [`UrlMapping`]. A failed URL is recorded as `None` and the batch goes on.

mod mapping;

use crate::fetch::Fetch;
use crate::storage;
use crate::url_model::derive_local_filename;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use mapping::{MappingEntry, UrlMapping};

/// Progress notification for one URL.
#[derive(Debug, Clone)]
pub enum DownloadEvent<'a> {
    /// About to fetch `url` (`index` is 1-based).
    Started {
        index: usize,
        total: usize,
        url: &'a str,
    },
    /// Saved to `path`.
    Saved {
        url: &'a str,
        filename: &'a str,
        path: &'a Path,
        bytes: usize,
    },
    /// Fetch or save failed; the URL maps to `None`.
    Failed { url: &'a str, error: String },
}

/// Download options shared by every URL of a batch.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Extension every saved file ends with (without the dot).
    pub extension: String,
    /// Pause between consecutive downloads.
    pub pause: Duration,
}

/// Fetches and saves one URL. Returns the local filename.
fn download_one<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    target_dir: &Path,
    extension: &str,
) -> Result<(String, PathBuf, usize)> {
    let body = fetcher.fetch(url)?;
    let filename = derive_local_filename(url, extension);
    let path = target_dir.join(&filename);
    storage::write_replace(&path, &body)?;
    Ok((filename, path, body.len()))
}

/// Downloads every URL in order into `target_dir`.
///
/// The returned mapping has one entry per distinct URL; a URL listed twice is
/// fetched twice and keeps the latest outcome. `target_dir` must exist.
pub fn download_all<F, E>(
    fetcher: &F,
    urls: &[String],
    target_dir: &Path,
    opts: &DownloadOptions,
    mut on_event: E,
) -> UrlMapping
where
    F: Fetch + ?Sized,
    E: FnMut(DownloadEvent<'_>),
{
    let mut mapping = UrlMapping::new();
    let total = urls.len();

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !opts.pause.is_zero() {
            std::thread::sleep(opts.pause);
        }
        on_event(DownloadEvent::Started {
            index: i + 1,
            total,
            url: url.as_str(),
        });
        match download_one(fetcher, url, target_dir, &opts.extension) {
            Ok((filename, path, bytes)) => {
                tracing::info!(url = %url, file = %path.display(), bytes, "downloaded");
                on_event(DownloadEvent::Saved {
                    url: url.as_str(),
                    filename: &filename,
                    path: &path,
                    bytes,
                });
                mapping.insert(url, Some(filename));
            }
            Err(e) => {
                tracing::warn!(url = %url, "download failed: {:#}", e);
                on_event(DownloadEvent::Failed {
                    url: url.as_str(),
                    error: format!("{:#}", e),
                });
                mapping.insert(url, None);
            }
        }
    }

    mapping
}
