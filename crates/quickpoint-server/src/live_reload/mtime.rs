//! Latest modification time across a directory tree.

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Return the most recent file modification time under `dir`, in seconds
/// since the Unix epoch.
///
/// Recomputed from scratch on every call. Entries that cannot be read or
/// stat'ed (e.g. deleted mid-walk) are skipped. Symlinked directories are
/// not descended into. Returns `0.0` for an empty or unreadable tree.
pub fn latest_mtime(dir: &Path) -> f64 {
    let mut latest = 0.0;
    walk(dir, &mut latest);
    latest
}

fn walk(dir: &Path, latest: &mut f64) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            walk(&path, latest);
            continue;
        }

        // follows symlinks, like the browser-facing file would
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if metadata.is_dir() {
            continue;
        }
        if let Some(secs) = modified_secs(&metadata)
            && secs > *latest
        {
            *latest = secs;
        }
    }
}

fn modified_secs(metadata: &Metadata) -> Option<f64> {
    let modified = metadata.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_secs_f64())
}
