//! Tracking and teardown of transient directories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

/// Records directories created during the run and removes them at shutdown.
///
/// Removal is best-effort: a directory that is already gone, or that cannot
/// be removed, is skipped without surfacing an error. Cleanup must never
/// raise this late in the run.
#[derive(Debug, Default)]
pub struct TempTracker {
    paths: Vec<PathBuf>,
}

impl TempTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory for removal at shutdown. There is no way to
    /// cancel tracking; a directory meant to persist is simply never tracked.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!("tracking temporary directory {}", path.display());
        self.paths.push(path);
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Removes every tracked directory and clears the set.
    pub fn cleanup_all(&mut self) {
        for path in self.paths.drain(..) {
            if let Err(err) = remove_dir_best_effort(&path) {
                debug!("leaving {} behind: {err}", path.display());
            }
        }
    }
}

fn remove_dir_best_effort(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path)
}
