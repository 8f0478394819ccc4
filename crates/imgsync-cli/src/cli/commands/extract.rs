//! `imgsync extract <document>` – list matching image URLs.

use anyhow::Result;
use imgsync_core::config::ImgsyncConfig;
use imgsync_core::driver;
use std::path::Path;

pub fn run_extract(cfg: &ImgsyncConfig, document: &Path) -> Result<()> {
    let urls = match driver::scan_document(document, cfg)? {
        Some(urls) => urls,
        None => {
            println!("Document not found: {}", document.display());
            return Ok(());
        }
    };
    if urls.is_empty() {
        println!("No .{} images found", cfg.target_extension);
        return Ok(());
    }
    println!("Found {} .{} image(s):", urls.len(), cfg.target_extension);
    for (i, url) in urls.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, url);
    }
    Ok(())
}
