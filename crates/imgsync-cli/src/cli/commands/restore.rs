//! `imgsync restore <document>` – move the backup back over the document.

use anyhow::Result;
use imgsync_core::rewrite;
use std::path::Path;

pub fn run_restore(document: &Path, backup: Option<&Path>) -> Result<()> {
    let restored = rewrite::restore_backup(document, backup)?;
    println!("Restored {} from {}", document.display(), restored.display());
    Ok(())
}
