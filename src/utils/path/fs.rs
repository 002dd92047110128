//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `clean_path` - lexical `.`/`..` removal, no file system access
//! - `relative_path` - relative path between two absolute paths

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Lexically cleaned path if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean_path(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| path.to_path_buf(), |cwd| clean_path(&cwd.join(path)))
        }
    })
}

/// Remove `.` and resolve `..` components lexically.
///
/// `..` at the root stays at the root; leading `..` of a relative path is kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Whether `path` equals `base` or lies below it (component-wise).
#[inline]
pub fn is_within(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}

/// Relative path from directory `from` to `to`. Both must be absolute.
///
/// # Example
/// ```ignore
/// relative_path(Path::new("/app/dist"), Path::new("/app/index.js")) // "../index.js"
/// ```
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component);
    }
    result
}

/// Render a relative path with forward slashes (for URLs and import specifiers).
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let normalized = normalize_path(Path::new("/absolute/./path/../file.txt"));
        assert_eq!(normalized, PathBuf::from("/absolute/file.txt"));
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("/a/b/..")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(clean_path(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("/app/dist/index.js"), Path::new("/app/dist")));
        assert!(is_within(Path::new("/app/dist"), Path::new("/app/dist")));
        assert!(!is_within(Path::new("/app/distribution"), Path::new("/app/dist")));
        assert!(!is_within(Path::new("/app"), Path::new("/app/dist")));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/app/dist"), Path::new("/app/index.js")),
            PathBuf::from("../index.js")
        );
        assert_eq!(
            relative_path(Path::new("/app"), Path::new("/app/pkg/index.js")),
            PathBuf::from("pkg/index.js")
        );
        assert_eq!(
            relative_path(Path::new("/app/dist/deep"), Path::new("/web/main.js")),
            PathBuf::from("../../../web/main.js")
        );
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("../src/index.js")), "../src/index.js");
        assert_eq!(to_slash(Path::new("./pkg")), "pkg");
    }
}
