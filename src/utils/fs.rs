//! Output file helpers.
//!
//! Every task writes through [`write_atomic`]: content goes to a hidden
//! sibling temp file that is renamed over the target, so the dev server
//! never reads a half-written file.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `content` to `path`, creating parent directories.
pub fn write_atomic(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    let temp = parent.join(format!(
        ".{name}.{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&temp)
            .with_context(|| format!("failed to create {}", temp.display()))?;
        file.write_all(content.as_ref())
            .with_context(|| format!("failed to write {}", temp.display()))?;
        file.sync_all().ok();
        fs::rename(&temp, path)
            .with_context(|| format!("failed to move output into {}", path.display()))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

/// Copy `src` to `dst` atomically.
pub fn copy_atomic(src: &Path, dst: &Path) -> Result<()> {
    let content = fs::read(src).with_context(|| format!("failed to read {}", src.display()))?;
    write_atomic(dst, content)
}

/// Remove everything inside `dir`, keeping the directory itself.
///
/// Returns the number of removed entries. A missing directory is created.
pub fn clear_dir(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("failed to remove {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}

/// Path relative to `root` for display, falling back to the full path.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Whether a path looks like an editor or tool temp file.
pub fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with('~')
        || name.ends_with(".tmp")
        || name.ends_with(".swp")
        || name.ends_with(".swx")
        || name.starts_with(".#")
        || (name.starts_with('#') && name.ends_with('#'))
        || name.ends_with(".crswap")
        || name == "4913"
}
