//! External tool execution.
//!
//! Runs a tool to completion and either logs its filtered output or returns
//! the whole output as the error. When our own stdout is a terminal the tool
//! runs inside a PTY so it keeps its colors and progress lines; otherwise
//! (CI, piped output) it runs as a plain child process.
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::new(bin)
//!     .name("wasm-pack")
//!     .args(["build", "--target", "web"])
//!     .cwd(crate_dir)
//!     .pty(std::io::stdout().is_terminal())
//!     .run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    fmt,
    io::Read,
    path::{Path, PathBuf},
    process::Command,
    sync::OnceLock,
};

/// Command builder for an external tool.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    /// Name used in log prefixes and errors; defaults to `program`.
    name: Option<String>,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    use_pty: bool,
    filter: Option<&'static FilterRule>,
}

/// A tool that ran but exited unsuccessfully.
#[derive(Debug)]
pub struct ToolFailure {
    pub name: String,
    /// Exit code, when the platform reports one.
    pub code: Option<i32>,
    /// Everything the tool printed, ANSI codes removed.
    pub output: String,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "`{}` exited with code {code}", self.name)?,
            None => write!(f, "`{}` was terminated", self.name)?,
        }
        let output = self.output.trim();
        if !output.is_empty() {
            write!(f, "\n{output}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolFailure {}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Name shown in logs instead of the program path.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add arguments; empty ones are dropped.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|arg| arg.as_ref().to_owned())
                .filter(|arg| !arg.is_empty()),
        );
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Run inside a pseudo-terminal.
    pub fn pty(mut self, enable: bool) -> Self {
        self.use_pty = enable;
        self
    }

    /// Progress lines to leave out of the log on success.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Run to completion and return everything the tool printed, ANSI codes
    /// removed. A non-zero exit is a [`ToolFailure`].
    pub fn run(self) -> Result<String> {
        let name = self.display_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        let (code, raw) = if self.use_pty {
            self.spawn_pty()?
        } else {
            self.spawn_plain()?
        };
        let text = strip_ansi(&raw).into_owned();

        if code != Some(0) {
            return Err(ToolFailure {
                name,
                code,
                output: text,
            }
            .into());
        }
        filter.log(&name, &text);
        Ok(text)
    }

    fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    fn spawn_plain(&self) -> Result<(Option<i32>, String)> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute `{}`", self.display_name()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status.code(), text))
    }

    fn spawn_pty(&self) -> Result<(Option<i32>, String)> {
        let mut builder = CommandBuilder::new(&self.program);
        builder.args(&self.args);
        if let Some(dir) = &self.cwd {
            builder.cwd(dir);
        }

        let pair = NativePtySystem::default().openpty(PtySize {
            rows: 24,
            cols: 120,
            pixel_width: 0,
            pixel_height: 0,
        })?;

        let mut child = pair
            .slave
            .spawn_command(builder)
            .with_context(|| format!("Failed to execute `{}`", self.display_name()))?;
        drop(pair.slave);

        // the PTY reader blocks until the child closes its side
        let mut reader = pair.master.try_clone_reader()?;
        let output = std::thread::spawn(move || {
            let mut output = String::new();
            let _ = reader.read_to_string(&mut output);
            output
        });

        let status = child.wait()?;
        drop(pair.master);

        let output = output
            .join()
            .map_err(|_| anyhow::anyhow!("Failed to join output reader thread"))?;

        #[allow(clippy::cast_possible_wrap)]
        Ok((Some(status.exit_code() as i32), output))
    }
}

/// Lines left out of the success log.
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

    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .map(str::trim)
            .filter(|line| !self.should_skip(line))
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Remove ANSI color codes and carriage returns.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\r").unwrap());
    re.replace_all(s, "")
}
