//! External command execution.
//!
//! Runs a command line taken from configuration (the script bundler) with
//! stdout captured and stderr logged through a noise filter.
//!
//! ```ignore
//! let output = Cmd::from_slice(&["esbuild", "--bundle"])
//!     .arg("js/main.js")
//!     .cwd(root)
//!     .run()?;
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Program and leading arguments from a configured command line.
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter().map(|s| s.as_ref().to_owned());
        let program = iter.next().unwrap_or_default();
        Self {
            program,
            args: iter.filter(|a| !a.is_empty()).collect(),
            ..Default::default()
        }
    }

    /// Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// A non-zero exit status is an error carrying the command's stderr.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program.to_string_lossy().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("failed to spawn `{name}`"))?;

        log_output(&name, &output, filter)?;
        Ok(output)
    }
}

/// Stderr lines to keep out of the log.
pub struct FilterRule {
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log the lines that pass the filter at debug level.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                !self.should_skip(plain.trim())
            })
            .collect();

        if !lines.is_empty() {
            crate::debug!(name; "{}", lines.join("\n"));
        }
    }
}

pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = strip_ansi(stderr.trim());

    let mut msg = format!("`{name}` failed with {}", output.status);
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr);
    }
    msg
}
