//! One run: extract → download → rewrite (or skip).
//!
//! The driver owns the URL mapping for the duration of a run and only
//! aggregates outcomes; retries live in the fetch client.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::ImgsyncConfig;
use crate::downloader::{self, DownloadEvent, DownloadOptions, UrlMapping};
use crate::extract::extract_image_urls;
use crate::fetch::Fetch;
use crate::rewrite::{self, RewriteOptions, RewriteReport};

/// Default name of the download directory next to the document.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_images";

/// Where a run reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub document_path: PathBuf,
    pub download_dir: PathBuf,
}

impl RunPaths {
    /// Download dir defaults to `downloaded_images` beside the document.
    pub fn for_document(document_path: &Path, download_dir: Option<&Path>) -> Self {
        let download_dir = match download_dir {
            Some(d) => d.to_path_buf(),
            None => document_dir(document_path).join(DEFAULT_DOWNLOAD_DIR),
        };
        Self {
            document_path: document_path.to_path_buf(),
            download_dir,
        }
    }

    /// Prefix that makes a file in `download_dir` reachable from the document,
    /// e.g. `./downloaded_images` or `../assets`. Both directories must exist.
    pub fn link_prefix(&self) -> Result<String> {
        let doc_dir = document_dir(&self.document_path);
        let from = fs::canonicalize(doc_dir)
            .with_context(|| format!("failed to resolve {}", doc_dir.display()))?;
        let to = fs::canonicalize(&self.download_dir)
            .with_context(|| format!("failed to resolve {}", self.download_dir.display()))?;
        relative_link(&from, &to).with_context(|| {
            format!(
                "{} cannot be referenced relative to {}",
                to.display(),
                from.display()
            )
        })
    }
}

fn document_dir(document_path: &Path) -> &Path {
    document_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// `/`-separated relative path from directory `from` to directory `to`.
/// Both must be absolute; `None` when they share no root (e.g. other drive).
fn relative_link(from: &Path, to: &Path) -> Option<String> {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return None;
    }

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    Some(match parts.first().map(String::as_str) {
        None => ".".to_string(),
        Some("..") => parts.join("/"),
        Some(_) => format!("./{}", parts.join("/")),
    })
}

/// Driver states, reported through [`RunEvent::Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Extracted,
    Downloaded,
    Rewritten,
    Skipped,
    Done,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The document does not exist; nothing was done.
    MissingInput,
    /// No matching image references.
    NoImages,
    /// Every download failed; the document was left as is.
    Skipped,
    Rewritten(RewriteReport),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Extracted references, duplicates included.
    pub urls: Vec<String>,
    pub mapping: UrlMapping,
    pub paths: RunPaths,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.urls.len()
    }

    pub fn succeeded(&self) -> usize {
        self.mapping.success_count()
    }
}

/// Live progress for a run.
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    Stage(Stage),
    Extracted(&'a [String]),
    Download(DownloadEvent<'a>),
}

/// Scans the document for image references without downloading anything.
/// Returns `Ok(None)` when the document is missing.
pub fn scan_document(document: &Path, cfg: &ImgsyncConfig) -> Result<Option<Vec<String>>> {
    if !document.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(document)
        .with_context(|| format!("failed to read {}", document.display()))?;
    Ok(Some(extract_image_urls(
        &text,
        &cfg.target_extension,
        cfg.extension_match,
    )))
}

/// Runs the whole pipeline once.
///
/// A missing document is a soft failure (`RunOutcome::MissingInput`). Document
/// and download-dir I/O errors are returned; download failures are not.
pub fn run<F, E>(fetcher: &F, cfg: &ImgsyncConfig, paths: &RunPaths, mut on_event: E) -> Result<RunReport>
where
    F: Fetch + ?Sized,
    E: FnMut(RunEvent<'_>),
{
    on_event(RunEvent::Stage(Stage::Init));
    let mut report = RunReport {
        outcome: RunOutcome::NoImages,
        urls: Vec::new(),
        mapping: UrlMapping::new(),
        paths: paths.clone(),
    };

    let urls = match scan_document(&paths.document_path, cfg)? {
        Some(urls) => urls,
        None => {
            tracing::warn!(document = %paths.document_path.display(), "document not found");
            report.outcome = RunOutcome::MissingInput;
            on_event(RunEvent::Stage(Stage::Done));
            return Ok(report);
        }
    };
    tracing::info!(count = urls.len(), "extracted image references");
    on_event(RunEvent::Stage(Stage::Extracted));
    on_event(RunEvent::Extracted(&urls));

    if urls.is_empty() {
        on_event(RunEvent::Stage(Stage::Done));
        return Ok(report);
    }

    fs::create_dir_all(&paths.download_dir).with_context(|| {
        format!("failed to create {}", paths.download_dir.display())
    })?;
    // Resolved before any download so an unreachable dir fails the run early.
    let link_prefix = paths.link_prefix()?;
    let opts = DownloadOptions {
        extension: cfg.target_extension.trim_start_matches('.').to_string(),
        pause: cfg.download_pause(),
    };
    let mapping = downloader::download_all(fetcher, &urls, &paths.download_dir, &opts, |ev| {
        on_event(RunEvent::Download(ev))
    });
    let succeeded = mapping.success_count();
    tracing::info!(succeeded, total = urls.len(), "downloads finished");
    on_event(RunEvent::Stage(Stage::Downloaded));

    report.outcome = if succeeded > 0 {
        let rewrite_opts = RewriteOptions {
            local_prefix: link_prefix,
            collision: cfg.backup_collision,
        };
        let rw = rewrite::rewrite_document(&paths.document_path, &mapping, &rewrite_opts)?;
        on_event(RunEvent::Stage(Stage::Rewritten));
        RunOutcome::Rewritten(rw)
    } else {
        tracing::warn!("no image downloaded; document left unchanged");
        on_event(RunEvent::Stage(Stage::Skipped));
        RunOutcome::Skipped
    };

    report.urls = urls;
    report.mapping = mapping;
    on_event(RunEvent::Stage(Stage::Done));
    Ok(report)
}
