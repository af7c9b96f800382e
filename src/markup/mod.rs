//! HTML include expansion.
//!
//! ```html
//! @include('html/header.html', { "title": "Home" })
//! <h1>@title</h1>
//! ```
//!
//! Fragments are expanded recursively with the including document's context
//! plus the directive's own object. `@name` (dotted names walk into objects)
//! is replaced by the context value; unknown names stay verbatim.

mod args;
mod error;


pub use error::IncludeError;

use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BasePath, MarkupConfig};

/// Deepest allowed fragment nesting.
pub const MAX_DEPTH: usize = 32;

type Context = Map<String, Value>;

pub struct Includer<'a> {
    basepath: &'a BasePath,
    source_root: &'a Path,
    pattern: Regex,
}

impl<'a> Includer<'a> {
    pub fn new(config: &'a MarkupConfig, source_root: &'a Path) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}(?:(?P<include>include)\s*\(|(?P<var>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*))",
            regex::escape(&config.prefix)
        ))?;
        Ok(Self {
            basepath: &config.basepath,
            source_root,
            pattern,
        })
    }

    /// Expand a page with an empty top-level context.
    pub fn expand_file(&self, file: &Path) -> Result<String, IncludeError> {
        let text = fs::read_to_string(file).map_err(|source| IncludeError::Read {
            file: file.to_path_buf(),
            source,
        })?;
        let root = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        self.expand(&text, file, &Context::new(), &mut vec![root])
    }

    /// Expand `text`, which was read from `file`.
    ///
    /// `stack` holds the canonical paths of every document being expanded.
    fn expand(
        &self,
        text: &str,
        file: &Path,
        context: &Context,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, IncludeError> {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        while let Some(caps) = self.pattern.captures_at(text, pos) {
            let Some(whole) = caps.get(0) else { break };
            out.push_str(&text[pos..whole.start()]);
            let line = line_of(text, whole.start());

            if caps.name("include").is_some() {
                let directive =
                    args::parse(&text[whole.end()..]).map_err(|reason| IncludeError::Malformed {
                        file: file.to_path_buf(),
                        line,
                        reason,
                    })?;

                if stack.len() > MAX_DEPTH {
                    return Err(IncludeError::TooDeep {
                        file: file.to_path_buf(),
                        line,
                    });
                }

                let fragment = self.resolve(file, &directive.path);
                let canonical = fs::canonicalize(&fragment)
                    .ok()
                    .filter(|p| p.is_file())
                    .ok_or_else(|| IncludeError::Missing {
                        file: file.to_path_buf(),
                        line,
                        include: directive.path.clone(),
                    })?;

                if stack.contains(&canonical) {
                    return Err(IncludeError::Cycle {
                        file: file.to_path_buf(),
                        line,
                        chain: cycle_chain(stack, &canonical),
                    });
                }

                let content = fs::read_to_string(&canonical).map_err(|source| IncludeError::Read {
                    file: fragment.clone(),
                    source,
                })?;

                let child_context = match directive.context {
                    Some(own) => {
                        let mut merged = context.clone();
                        merged.extend(own);
                        merged
                    }
                    None => context.clone(),
                };

                stack.push(canonical);
                let expanded = self.expand(&content, &fragment, &child_context, stack);
                stack.pop();

                out.push_str(&expanded?);
                pos = whole.end() + directive.len;
            } else {
                match caps.name("var").and_then(|name| lookup(context, name.as_str())) {
                    Some(value) => out.push_str(&render(value)),
                    None => out.push_str(whole.as_str()),
                }
                pos = whole.end();
            }
        }

        out.push_str(&text[pos..]);
        Ok(out)
    }

    fn resolve(&self, file: &Path, include: &str) -> PathBuf {
        let base = match self.basepath {
            BasePath::File => file.parent().unwrap_or(self.source_root),
            BasePath::Root => self.source_root,
            BasePath::Dir(dir) => dir,
        };
        base.join(include)
    }
}

/// Walk a dotted name (`meta.title`) through the context.
fn lookup<'c>(context: &'c Context, name: &str) -> Option<&'c Value> {
    let mut parts = name.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// `a.html -> b.html -> a.html`, by file name.
fn cycle_chain(stack: &[PathBuf], repeated: &Path) -> String {
    let start = stack.iter().position(|p| p == repeated).unwrap_or(0);
    stack[start..]
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(repeated))
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}
