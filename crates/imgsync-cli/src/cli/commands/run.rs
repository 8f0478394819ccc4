//! `imgsync run <document>` – download images and rewrite the document.

use anyhow::Result;
use imgsync_core::config::ImgsyncConfig;
use imgsync_core::downloader::DownloadEvent;
use imgsync_core::driver::{self, RunEvent, RunOutcome, RunPaths, Stage};
use imgsync_core::fetch::FetchClient;
use std::path::Path;

fn print_event(ev: RunEvent<'_>) {
    match ev {
        RunEvent::Stage(Stage::Downloaded) => println!(),
        RunEvent::Stage(_) => {}
        RunEvent::Extracted(urls) if !urls.is_empty() => {
            println!("Found {} image(s):", urls.len());
            for (i, url) in urls.iter().enumerate() {
                println!("  {:>3}. {}", i + 1, url);
            }
            println!();
        }
        RunEvent::Extracted(_) => {}
        RunEvent::Download(DownloadEvent::Started { index, total, url }) => {
            println!("[{}/{}] {}", index, total, url);
        }
        RunEvent::Download(DownloadEvent::Saved {
            filename, bytes, ..
        }) => {
            println!("  saved {} ({} bytes)", filename, bytes);
        }
        RunEvent::Download(DownloadEvent::Failed { error, .. }) => {
            println!("  failed: {}", error);
        }
    }
}

pub fn run_pipeline(cfg: &ImgsyncConfig, document: &Path, download_dir: Option<&Path>) -> Result<()> {
    let paths = RunPaths::for_document(document, download_dir);
    let client = FetchClient::from_config(cfg)?;
    println!("Scanning {}", paths.document_path.display());

    let report = driver::run(&client, cfg, &paths, print_event)?;

    match &report.outcome {
        RunOutcome::MissingInput => {
            println!("Document not found: {}", paths.document_path.display());
        }
        RunOutcome::NoImages => {
            println!("No .{} images found", cfg.target_extension);
        }
        RunOutcome::Skipped => {
            println!("Downloaded: {}/{}", report.succeeded(), report.total());
            println!("No image downloaded; {} left unchanged", paths.document_path.display());
        }
        RunOutcome::Rewritten(rw) => {
            println!("Downloaded: {}/{}", report.succeeded(), report.total());
            println!("Images saved in: {}", paths.download_dir.display());
            for r in &rw.replacements {
                println!("  {} -> {} ({}x)", r.url, r.local_path, r.count);
            }
            println!("Backup: {}", rw.backup_path.display());
            println!("Rewrote {}", paths.document_path.display());
        }
    }
    Ok(())
}
