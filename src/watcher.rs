use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A watched file and the modification time last seen for it.
#[derive(Debug, Clone)]
pub struct WatchEntry {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl WatchEntry {
    fn new(path: PathBuf) -> Self {
        let modified = modified_time(&path);
        Self { path, modified }
    }
}

/// Polls shader files for modification time changes.
///
/// A file that disappears or reappears counts as a change.
#[derive(Debug, Default)]
pub struct ShaderWatcher {
    entries: Vec<WatchEntry>,
}

impl ShaderWatcher {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entries = paths
            .into_iter()
            .map(|path| WatchEntry::new(path.into()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    /// Returns `true` if any watched file changed since the last poll.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            let modified = modified_time(&entry.path);
            if modified != entry.modified {
                log::debug!("{} changed on disk", entry.path.display());
                entry.modified = modified;
                changed = true;
            }
        }
        changed
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
