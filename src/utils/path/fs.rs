//! Path normalization.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, then falls back to joining with the
/// current directory (the path may not exist yet, e.g. the output dir).
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_is_absolute() {
        assert!(normalize_path(Path::new("relative/missing")).is_absolute());
        assert_eq!(
            normalize_path(Path::new("/no/such/dir")),
            PathBuf::from("/no/such/dir")
        );
    }
}
