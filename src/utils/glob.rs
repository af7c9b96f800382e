//! Source glob matching and expansion.
//!
//! Patterns are relative to the source root and use `/` separators:
//!
//! - `*` matches within one path component, `**` any number of directories
//! - `{a,b}` alternation is expanded before compiling
//! - a leading `!` turns the pattern into an exclusion
//!
//! Each include pattern has a *static base*: the leading components that
//! contain no wildcard (`img` for `img/*.png`). Outputs keep the path of a
//! match relative to that base.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// A compiled include pattern with its static base directory.
#[derive(Debug, Clone)]
struct Include {
    pattern: Pattern,
    base: PathBuf,
}

/// A set of include/exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct GlobSet {
    includes: Vec<Include>,
    excludes: Vec<Pattern>,
}

/// A file matched by a [`GlobSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatch {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the static base of the matching pattern.
    pub relative: PathBuf,
}

impl GlobSet {
    /// Compile a list of patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut set = Self::default();
        for raw in patterns {
            let raw = raw.as_ref().trim();

            let (negated, body) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let body = body.trim_start_matches("./");

            for expanded in expand_braces(body) {
                let pattern = Pattern::new(&expanded)
                    .with_context(|| format!("invalid glob pattern `{raw}`"))?;
                if negated {
                    set.excludes.push(pattern);
                } else {
                    set.includes.push(Include {
                        base: static_base(&expanded),
                        pattern,
                    });
                }
            }
        }
        Ok(set)
    }

    /// Check a source-relative path against the set.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.matching_include(relative).is_some()
    }

    /// Find the first include that matches and no exclude rejects.
    fn matching_include(&self, relative: &Path) -> Option<&Include> {
        let text = to_slash(relative);
        if self
            .excludes
            .iter()
            .any(|p| p.matches_with(&text, MATCH_OPTIONS))
        {
            return None;
        }
        self.includes
            .iter()
            .find(|inc| inc.pattern.matches_with(&text, MATCH_OPTIONS))
    }

    /// Walk `root` and return all matching files, sorted by path.
    ///
    /// Only the static base of each include is walked. Missing bases are
    /// skipped, so an empty directory layout yields an empty result.
    pub fn walk(&self, root: &Path) -> Vec<GlobMatch> {
        let mut bases: Vec<&Path> = self.includes.iter().map(|i| i.base.as_path()).collect();
        bases.sort();
        bases.dedup();
        // Drop bases nested inside another base
        let bases: Vec<&Path> = bases
            .iter()
            .filter(|b| !bases.iter().any(|o| o != *b && b.starts_with(o)))
            .copied()
            .collect();

        let mut matches = Vec::new();
        for base in bases {
            let dir = root.join(base);
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).sort(true).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_str().unwrap_or_default();
                if IGNORED_FILES.contains(&name) {
                    continue;
                }
                let path = entry.path();
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                if let Some(include) = self.matching_include(relative) {
                    let relative = relative
                        .strip_prefix(&include.base)
                        .unwrap_or(relative)
                        .to_path_buf();
                    matches.push(GlobMatch { path, relative });
                }
            }
        }

        matches.sort_by(|a, b| a.path.cmp(&b.path));
        matches.dedup_by(|a, b| a.path == b.path);
        matches
    }
}

/// Expand `{a,b}` alternations (nested groups supported).
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    // Find the matching close brace
    let mut depth = 0;
    let mut close = None;
    for (i, c) in pattern[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let inner = &pattern[open + 1..close];

    // Split inner on top-level commas
    let mut options = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                options.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    options.push(&inner[start..]);

    options
        .into_iter()
        .flat_map(|opt| expand_braces(&format!("{prefix}{opt}{suffix}")))
        .collect()
}

/// Leading components of a pattern that contain no wildcard.
fn static_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    // The last component is the file part, never a base
    for component in &components[..components.len().saturating_sub(1)] {
        if component.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component);
    }
    base
}

/// Render a relative path with `/` separators.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(
            expand_braces("img/*.{jpg,png}"),
            vec!["img/*.jpg", "img/*.png"]
        );
        assert_eq!(expand_braces("plain/*.svg"), vec!["plain/*.svg"]);
        assert_eq!(
            expand_braces("{a,b}/{x,y}"),
            vec!["a/x", "a/y", "b/x", "b/y"]
        );
        assert_eq!(expand_braces("{a,{b,c}}.js"), vec!["a.js", "b.js", "c.js"]);
    }

    #[test]
    fn test_static_base() {
        assert_eq!(static_base("img/*.png"), PathBuf::from("img"));
        assert_eq!(static_base("resources/**"), PathBuf::from("resources"));
        assert_eq!(static_base("scss/**/*.scss"), PathBuf::from("scss"));
        assert_eq!(static_base("index.html"), PathBuf::new());
        assert_eq!(static_base("a/b/c.txt"), PathBuf::from("a/b"));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let set = GlobSet::new(&["img/*.png"]).unwrap();
        assert!(set.is_match(Path::new("img/a.png")));
        assert!(!set.is_match(Path::new("img/icons/a.png")));
    }

    #[test]
    fn test_double_star_recurses() {
        let set = GlobSet::new(&["scss/**/*.scss"]).unwrap();
        assert!(set.is_match(Path::new("scss/main.scss")));
        assert!(set.is_match(Path::new("scss/parts/_vars.scss")));
        assert!(!set.is_match(Path::new("js/main.js")));
    }

    #[test]
    fn test_exclusion() {
        let set = GlobSet::new(&["img/*.{jpg,png}", "!img/css-*.{jpg,png}"]).unwrap();
        assert!(set.is_match(Path::new("img/photo.jpg")));
        assert!(!set.is_match(Path::new("img/css-bg.png")));
        assert!(!set.is_match(Path::new("img/logo.svg")));
    }

    #[test]
    fn test_walk_keeps_path_relative_to_base() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "resources/robots.txt");
        touch(temp.path(), "resources/docs/a.pdf");
        touch(temp.path(), "img/x.png");

        let set = GlobSet::new(&["resources/**"]).unwrap();
        let matches = set.walk(temp.path());
        let rels: Vec<_> = matches.iter().map(|m| m.relative.clone()).collect();
        assert_eq!(
            rels,
            vec![PathBuf::from("docs/a.pdf"), PathBuf::from("robots.txt")]
        );
    }

    #[test]
    fn test_walk_missing_base_is_empty() {
        let temp = TempDir::new().unwrap();
        let set = GlobSet::new(&["fonts/*.ttf"]).unwrap();
        assert!(set.walk(temp.path()).is_empty());
    }

    #[test]
    fn test_walk_root_level_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.html");
        touch(temp.path(), "html/header.html");

        let set = GlobSet::new(&["index.html"]).unwrap();
        let matches = set.walk(temp.path());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].relative, PathBuf::from("index.html"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(GlobSet::new(&["img/[.png"]).is_err());
    }
}
