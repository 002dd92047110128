use std::path::PathBuf;

use notify::RecursiveMode;

use crate::config::BuildConfig;

/// Crate sources recursively, plus the directories holding individually
/// watched files. Single files are watched through their parent so an
/// atomic save (rename over) keeps being observed.
pub(super) fn collect_watch_paths(config: &BuildConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths: Vec<(PathBuf, RecursiveMode)> = config
        .watched_dirs()
        .into_iter()
        .map(|dir| (dir, RecursiveMode::Recursive))
        .collect();

    for file in config.watched_files() {
        let Some(parent) = file.parent() else {
            continue;
        };
        if paths.iter().any(|(dir, _)| dir == parent) {
            continue;
        }
        paths.push((parent.to_path_buf(), RecursiveMode::NonRecursive));
    }
    paths
}
