//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/app/src/     ← cwd
/// /home/user/app/wasp.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Same as [`find_config_file`], starting the walk at `start`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Expand `~` and resolve `path` against `root`.
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    crate::utils::path::normalize_path(&full_path)
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("wasp.toml"), "").unwrap();

        let found = find_config_file_from(&nested, Path::new("wasp.toml")).unwrap();
        assert_eq!(found, dir.path().join("wasp.toml"));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file_from(dir.path(), Path::new("no-such-config.toml")).is_none());
    }

    #[test]
    fn test_find_config_ignores_directory_with_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir_all(inner.join("wasp.toml")).unwrap();
        fs::write(dir.path().join("wasp.toml"), "").unwrap();

        let found = find_config_file_from(&inner, Path::new("wasp.toml")).unwrap();
        assert_eq!(found, dir.path().join("wasp.toml"));
    }

    #[test]
    fn test_resolve_against_relative() {
        let resolved = resolve_against(Path::new("/project"), Path::new("dist"));
        assert_eq!(resolved, PathBuf::from("/project/dist"));
    }

    #[test]
    fn test_resolve_against_absolute() {
        let resolved = resolve_against(Path::new("/project"), Path::new("/tmp/out"));
        assert!(resolved.ends_with("out"));
        assert!(resolved.is_absolute());
    }
}
