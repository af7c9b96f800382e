//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything escaping the root
/// (`..`, symlinks) resolves to `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Decode, strip query and fragment, trim slashes
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/main.min.css"), "a{}").unwrap();
        fs::write(dir.path().join("my file.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn test_root_serves_index() {
        let dir = site();
        let resolved = resolve_path("/", dir.path()).unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_query_and_encoding() {
        let dir = site();
        assert!(resolve_path("/css/main.min.css?v=123", dir.path()).is_some());
        assert!(resolve_path("/my%20file.txt", dir.path()).is_some());
        assert!(resolve_path("/css", dir.path()).is_none());
        assert!(resolve_path("/missing.js", dir.path()).is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let inner = dir.path().join("css");
        assert!(resolve_path("/../index.html", &inner).is_none());
        assert!(resolve_path("/%2e%2e/index.html", &inner).is_none());
    }
}
