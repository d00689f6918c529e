//! External-process invocation: the typesetter and the vector tool.
//!
//! [`ToolRunner::run`] never fails. A launch failure and a non-zero exit
//! both come back as a [`ToolOutput`] whose `success()` is false, with
//! whatever diagnostics were available in `output`. The orchestrator turns
//! those into per-item reports and moves on.
//!
//! Invocations are awaited one at a time; the pipeline never has two tools
//! running concurrently.

use crate::error::ToolUnavailable;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

/// Exit status and captured output of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` if the process never started or was killed by a signal.
    pub exit_code: Option<i32>,
    /// stdout followed by stderr, lossily decoded.
    pub output: String,
    /// Set when the process could not be launched at all.
    pub launch_error: Option<String>,
}

impl ToolOutput {
    /// A process that ran and exited with `code`.
    pub fn exited(code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            output: output.into(),
            launch_error: None,
        }
    }

    /// A process that could not be started. `error` is the OS reason,
    /// without a "failed to launch" prefix.
    pub fn launch_failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            exit_code: None,
            output: error.clone(),
            launch_error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.launch_error.is_none() && self.exit_code == Some(0)
    }

    /// Short status for reports: `exit code 1`, `failed to launch`, …
    pub fn status_text(&self) -> String {
        match (&self.launch_error, self.exit_code) {
            (Some(_), _) => "failed to launch".to_string(),
            (None, Some(code)) => format!("exit code {code}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Runs an external executable and captures its result.
pub trait ToolRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> impl Future<Output = ToolOutput> + Send;
}

/// [`ToolRunner`] backed by real OS processes.
///
/// stdin is closed so an interactive prompt (e.g. a typesetter error stop)
/// sees EOF and exits instead of waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> ToolOutput {
        debug!("Running {}", display_command(program, args));

        let result = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) => {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&out.stderr);
                if !stderr.is_empty() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }
                ToolOutput {
                    exit_code: out.status.code(),
                    output: text,
                    launch_error: None,
                }
            }
            Err(e) => ToolOutput::launch_failed(format!("'{}': {e}", program.display())),
        }
    }
}

/// Render a command line for logs, quoting arguments that contain spaces.
pub fn display_command(program: &Path, args: &[OsString]) -> String {
    let mut line = quote(program.as_os_str());
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg));
    }
    line
}

fn quote(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    if s.contains(' ') {
        format!("\"{s}\"")
    } else {
        s.into_owned()
    }
}

// ── Invocation contracts ─────────────────────────────────────────────────

/// `--version`, shared by both tools' availability probes.
pub fn version_args() -> Vec<OsString> {
    vec![OsString::from("--version")]
}

/// `-output-directory <dir> <unit_file>`
pub fn typesetter_args(output_dir: &Path, unit_file: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-output-directory"),
        output_dir.as_os_str().to_os_string(),
        unit_file.as_os_str().to_os_string(),
    ]
}

/// `--pdf-poppler --export-type=svg --export-filename=<svg> <pdf>`
pub fn vector_tool_args(pdf: &Path, svg: &Path) -> Vec<OsString> {
    let mut export = OsString::from("--export-filename=");
    export.push(svg.as_os_str());
    vec![
        OsString::from("--pdf-poppler"),
        OsString::from("--export-type=svg"),
        export,
        pdf.as_os_str().to_os_string(),
    ]
}

// ── Path resolution ──────────────────────────────────────────────────────

/// A tool whose version probe succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub path: PathBuf,
    /// First non-empty line of the probe output.
    pub version: String,
}

/// Ordered candidates for one tool; the first that answers `--version` wins.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    name: String,
    candidates: Vec<PathBuf>,
}

impl ToolResolver {
    pub fn new(name: impl Into<String>, candidates: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }

    /// Probe each candidate in order.
    pub async fn resolve<R: ToolRunner>(&self, runner: &R) -> Result<ResolvedTool, ToolUnavailable> {
        let mut detail = String::from("no candidates configured");

        for candidate in &self.candidates {
            let out = runner.run(candidate, &version_args()).await;
            if out.success() {
                let version = out
                    .output
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or_default()
                    .to_string();
                return Ok(ResolvedTool {
                    path: candidate.clone(),
                    version,
                });
            }
            debug!(
                "{} probe failed for '{}': {}",
                self.name,
                candidate.display(),
                out.status_text()
            );
            detail = format!("{}: {}", out.status_text(), out.output.trim());
        }

        Err(ToolUnavailable {
            tool: self.name.clone(),
            tried: self.candidates.clone(),
            detail,
        })
    }
}

impl fmt::Display for ResolvedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.version)
    }
}
