//! Rewrites the HTML document to point at the downloaded copies.
//!
//! Substitution is plain substring replacement of each remote URL. The new
//! content is committed in three steps:
//!
//! 1. write it to `<doc>.part` (which must not exist yet) and fsync;
//! 2. rename `<doc>` to the backup path;
//! 3. rename `<doc>.part` to `<doc>`.
//!
//! A failure in step 1 or 2 leaves the document untouched (the `.part` file is
//! removed). A failure in step 3 renames the backup back to `<doc>`. Only if
//! that rollback fails too is the document left missing; the error then names
//! the backup so it can be restored by hand (`imgsync restore`).

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::BackupCollision;
use crate::downloader::UrlMapping;
use crate::storage;

/// Suffix appended to the document path for the backup.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Rewrite failures callers may want to tell apart (downcast from `anyhow::Error`).
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("backup already exists: {}", .0.display())]
    BackupExists(PathBuf),
    #[error(
        "failed to move new content into place ({source}); restoring from {} also failed: {restore}",
        .backup.display()
    )]
    RollbackFailed {
        backup: PathBuf,
        source: io::Error,
        restore: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Local reference prefix; each URL becomes `<prefix>/<filename>`.
    pub local_prefix: String,
    pub collision: BackupCollision,
}

/// One substituted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub url: String,
    pub local_path: String,
    /// Occurrences replaced in the document.
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct RewriteReport {
    pub backup_path: PathBuf,
    pub replacements: Vec<Replacement>,
}

/// `index.html` → `index.html.backup`.
pub fn backup_path(document: &Path) -> PathBuf {
    let mut o = document.as_os_str().to_owned();
    o.push(BACKUP_SUFFIX);
    PathBuf::from(o)
}

/// Picks where the backup goes according to the collision policy.
pub fn choose_backup_path(document: &Path, collision: BackupCollision) -> Result<PathBuf> {
    let base = backup_path(document);
    if !base.exists() {
        return Ok(base);
    }
    match collision {
        BackupCollision::Overwrite => {
            tracing::warn!(backup = %base.display(), "overwriting existing backup");
            Ok(base)
        }
        BackupCollision::Fail => Err(RewriteError::BackupExists(base).into()),
        BackupCollision::Numbered => {
            let mut n = 1u32;
            loop {
                let mut o = base.as_os_str().to_owned();
                o.push(format!(".{}", n));
                let candidate = PathBuf::from(o);
                if !candidate.exists() {
                    return Ok(candidate);
                }
                n = n
                    .checked_add(1)
                    .context("no free numbered backup path")?;
            }
        }
    }
}

/// Replaces every successful URL of `mapping` in `content`, in mapping order.
pub fn substitute(content: &str, mapping: &UrlMapping, local_prefix: &str) -> (String, Vec<Replacement>) {
    let prefix = local_prefix.trim_end_matches('/');
    let mut out = content.to_string();
    let mut replacements = Vec::new();

    for (url, filename) in mapping.successes() {
        let local_path = format!("{}/{}", prefix, filename);
        let count = out.matches(url).count();
        if count > 0 {
            out = out.replace(url, &local_path);
        }
        replacements.push(Replacement {
            url: url.to_string(),
            local_path,
            count,
        });
    }

    (out, replacements)
}

/// Substitutes successful downloads into the document and commits it with a backup.
///
/// Document read/write failures are returned as errors; they are fatal for a run.
pub fn rewrite_document(
    document: &Path,
    mapping: &UrlMapping,
    opts: &RewriteOptions,
) -> Result<RewriteReport> {
    let content = fs::read_to_string(document)
        .with_context(|| format!("failed to read {}", document.display()))?;
    let (new_content, replacements) = substitute(&content, mapping, &opts.local_prefix);
    for r in &replacements {
        tracing::info!(url = %r.url, local = %r.local_path, count = r.count, "replaced");
    }

    let backup = choose_backup_path(document, opts.collision)?;
    let staged = storage::stage_new(document, new_content.as_bytes())?;
    commit(document, &staged, &backup)?;
    tracing::info!(document = %document.display(), backup = %backup.display(), "document rewritten");

    Ok(RewriteReport {
        backup_path: backup,
        replacements,
    })
}

/// Steps 2 and 3 of the commit, with rollback of step 2 if step 3 fails.
fn commit(document: &Path, staged: &Path, backup: &Path) -> Result<()> {
    commit_with(document, staged, backup, |from, to| fs::rename(from, to))
}

fn commit_with<R>(document: &Path, staged: &Path, backup: &Path, mut rename: R) -> Result<()>
where
    R: FnMut(&Path, &Path) -> io::Result<()>,
{
    if let Err(e) = rename(document, backup) {
        let _ = fs::remove_file(staged);
        return Err(e).with_context(|| {
            format!("failed to back up {} to {}", document.display(), backup.display())
        });
    }

    if let Err(e) = rename(staged, document) {
        return match rename(backup, document) {
            Ok(()) => {
                let _ = fs::remove_file(staged);
                Err(e).with_context(|| {
                    format!(
                        "failed to move {} into place; original restored",
                        staged.display()
                    )
                })
            }
            Err(restore) => Err(RewriteError::RollbackFailed {
                backup: backup.to_path_buf(),
                source: e,
                restore,
            }
            .into()),
        };
    }
    Ok(())
}

/// Moves a backup back over the document. Defaults to `<doc>.backup`.
/// Returns the backup path that was restored.
pub fn restore_backup(document: &Path, backup: Option<&Path>) -> Result<PathBuf> {
    let backup = backup
        .map(Path::to_path_buf)
        .unwrap_or_else(|| backup_path(document));
    if !backup.exists() {
        anyhow::bail!("no backup at {}", backup.display());
    }
    fs::rename(&backup, document).with_context(|| {
        format!("failed to restore {} to {}", backup.display(), document.display())
    })?;
    tracing::info!(document = %document.display(), backup = %backup.display(), "backup restored");
    Ok(backup)
}
