//! File lifecycle: stage content in a `.part` file, then rename into place.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `pic.png` → `pic.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `data` to `temp_path(final_path)` and fsyncs it. Truncates any leftover temp file.
/// Returns the temp path; the caller decides when to move it into place.
pub fn stage(final_path: &Path, data: &[u8]) -> Result<PathBuf> {
    let tp = temp_path(final_path);
    if tp.exists() {
        tracing::warn!(path = %tp.display(), "replacing leftover temp file");
    }
    let mut options = File::options();
    options.write(true).create(true).truncate(true);
    write_staged(&tp, &options, data)?;
    Ok(tp)
}

/// Like [`stage`], but fails if the temp file already exists and leaves it untouched.
/// Used for files the user owns, where a `<name>.part` may not be ours.
pub fn stage_new(final_path: &Path, data: &[u8]) -> Result<PathBuf> {
    let tp = temp_path(final_path);
    let mut options = File::options();
    options.write(true).create_new(true);
    write_staged(&tp, &options, data)?;
    Ok(tp)
}

fn write_staged(tp: &Path, options: &OpenOptions, data: &[u8]) -> Result<()> {
    let mut file = options
        .open(tp)
        .with_context(|| format!("failed to create temp file: {}", tp.display()))?;
    let written = file
        .write_all(data)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write temp file: {}", tp.display()));
    if let Err(e) = written {
        drop(file);
        let _ = std::fs::remove_file(tp);
        return Err(e);
    }
    Ok(())
}

/// Writes `data` to `final_path` through a temp file, replacing any existing file.
/// Readers never observe a half-written `final_path`.
pub fn write_replace(final_path: &Path, data: &[u8]) -> Result<()> {
    let tp = stage(final_path, data)?;
    if let Err(e) = std::fs::rename(&tp, final_path) {
        let _ = std::fs::remove_file(&tp);
        return Err(e).with_context(|| {
            format!("failed to rename {} to {}", tp.display(), final_path.display())
        });
    }
    Ok(())
}
