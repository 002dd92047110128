use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::types::{Change, ChangeKind, FileCategory};
use crate::config::BuildConfig;

/// Turns raw debounced events into changes the build cares about.
///
/// Pipeline: correct_by_existence → categorize → drop_unchanged
pub(super) struct EventClassifier {
    /// Last seen content of modified files
    hashes: FxHashMap<PathBuf, blake3::Hash>,
}

impl EventClassifier {
    /// Seed content hashes for the individually watched files.
    pub(super) fn new(config: &BuildConfig) -> Self {
        let mut hashes = FxHashMap::default();
        for path in config.watched_files() {
            if let Some(hash) = hash_file(&path) {
                hashes.insert(path, hash);
            }
        }
        Self { hashes }
    }

    pub(super) fn classify(
        &mut self,
        raw: FxHashMap<PathBuf, ChangeKind>,
        config: &BuildConfig,
    ) -> Vec<Change> {
        let mut changes = raw;
        Self::correct_by_existence(&mut changes);

        let mut result: Vec<Change> = changes
            .into_iter()
            .filter(|(path, kind)| *kind == ChangeKind::Removed || path.is_file())
            .filter_map(|(path, kind)| {
                let category = categorize(&path, config);
                (category != FileCategory::Unrelated).then_some(Change {
                    path,
                    kind,
                    category,
                })
            })
            .collect();

        result.retain(|change| self.content_changed(change));
        result.sort_by(|a, b| a.path.cmp(&b.path));
        result
    }

    /// Reconcile event kinds with actual filesystem state.
    ///
    /// Atomic saves report Removed for a file that exists again, and a burst
    /// may report Created for a file that is already gone.
    fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        changes.retain(|path, kind| {
            let exists = path.exists();
            match *kind {
                ChangeKind::Created if !exists => false,
                ChangeKind::Modified if !exists => {
                    *kind = ChangeKind::Removed;
                    true
                }
                ChangeKind::Removed if exists => {
                    *kind = ChangeKind::Modified;
                    true
                }
                _ => true,
            }
        });
    }

    /// False for a modification that left the bytes untouched (editor touch, formatter no-op).
    fn content_changed(&mut self, change: &Change) -> bool {
        if change.kind == ChangeKind::Removed {
            self.hashes.remove(&change.path);
            return true;
        }
        let Some(hash) = hash_file(&change.path) else {
            return true;
        };
        let previous = self.hashes.insert(change.path.clone(), hash);
        if change.kind == ChangeKind::Modified && previous == Some(hash) {
            crate::debug!("watch"; "unchanged content: {}", change.path.display());
            return false;
        }
        true
    }
}

/// What a path means for the build.
pub(super) fn categorize(path: &Path, config: &BuildConfig) -> FileCategory {
    if config.config_path.as_deref() == Some(path) {
        return FileCategory::Config;
    }
    if path == config.entry || path == config.html.template {
        return FileCategory::Web;
    }
    if config.wasm.enable
        && (path == config.wasm.manifest_path()
            || config.watched_dirs().iter().any(|dir| path.starts_with(dir)))
    {
        return FileCategory::Crate;
    }
    FileCategory::Unrelated
}

fn hash_file(path: &Path) -> Option<blake3::Hash> {
    std::fs::read(path).ok().map(|bytes| blake3::hash(&bytes))
}
