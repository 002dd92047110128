//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL against each root in order.
///
/// Build output shadows the static root, so a stale `index.html` in the
/// project directory never hides the generated one.
pub fn resolve_path(url: &str, roots: &[&Path]) -> Option<PathBuf> {
    let clean = normalize_url(url)?;
    roots.iter().find_map(|root| resolve_in_root(&clean, root))
}

/// Resolve a cleaned URL path under a single root, handling index.html for directories
fn resolve_in_root(clean: &str, serve_root: &Path) -> Option<PathBuf> {
    let local = serve_root.join(clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Strip the query string, decode and trim slashes. `None` for traversal attempts.
fn normalize_url(url: &str) -> Option<String> {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let clean = decoded.trim_matches('/');

    // Reject parent components early, including encoded ones
    if clean.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }
    Some(clean.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn roots() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dist");
        let static_root = dir.path().join("www");
        fs::create_dir_all(output.join("pkg")).unwrap();
        fs::create_dir_all(&static_root).unwrap();
        fs::write(output.join("index.html"), "built").unwrap();
        fs::write(output.join("pkg/index_bg.wasm"), b"\0asm").unwrap();
        fs::write(static_root.join("index.html"), "static").unwrap();
        fs::write(static_root.join("favicon.ico"), "ico").unwrap();
        (dir, output, static_root)
    }

    #[test]
    fn test_root_maps_to_index() {
        let (_dir, output, static_root) = roots();
        let path = resolve_path("/", &[&output, &static_root]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "built");
    }

    #[test]
    fn test_falls_back_to_static_root() {
        let (_dir, output, static_root) = roots();
        let path = resolve_path("/favicon.ico?v=2", &[&output, &static_root]).unwrap();
        assert!(path.ends_with("www/favicon.ico"));
    }

    #[test]
    fn test_nested_output_file() {
        let (_dir, output, static_root) = roots();
        let path = resolve_path("/pkg/index_bg.wasm", &[&output, &static_root]).unwrap();
        assert!(path.ends_with("dist/pkg/index_bg.wasm"));
    }

    #[test]
    fn test_traversal_rejected() {
        let (dir, output, static_root) = roots();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();

        assert!(resolve_path("/../secret.txt", &[&output, &static_root]).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &[&output, &static_root]).is_none());
        assert!(resolve_path("/pkg/..%2F..%2Fsecret.txt", &[&output, &static_root]).is_none());
    }

    #[test]
    fn test_missing_file() {
        let (_dir, output, static_root) = roots();
        assert!(resolve_path("/nope.js", &[&output, &static_root]).is_none());
    }
}
