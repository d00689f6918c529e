//! Per-document run log.
//!
//! One [`RunLog`] exists per document being processed. It is opened when the
//! document starts, receives every status line, and is closed when the
//! document finishes. Each line is appended to `<output_dir>/<log name>`,
//! mirrored through `tracing`, and forwarded to the progress callback's
//! [`on_status`](crate::progress::PipelineProgressCallback::on_status) hook.
//!
//! If the file cannot be opened the log degrades to console-only; losing the
//! log file never stops a run.

use crate::progress::ProgressCallback;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only status log for one document.
pub struct RunLog {
    path: PathBuf,
    file: Option<File>,
    listener: Option<ProgressCallback>,
}

impl RunLog {
    /// Open (or create) the log in append mode and write the start header.
    ///
    /// `listener` receives every status and failure line.
    pub fn open(path: impl Into<PathBuf>, listener: Option<ProgressCallback>) -> Self {
        let path = path.into();
        let (file, open_error) = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => (Some(f), None),
            Err(e) => (None, Some(e)),
        };

        let mut log = Self {
            path,
            file,
            listener,
        };
        if let Some(e) = open_error {
            let msg = format!(
                "Cannot open run log {}: {e}; logging to console only",
                log.path.display()
            );
            log.failure(msg);
        }
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        log.write_line(&format!("=== Run started {stamp} ==="));
        log
    }

    /// Path of the log file, if it is being written.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|_| self.path.as_path())
    }

    /// Record a status line.
    pub fn status(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        info!("{line}");
        self.notify(line, false);
        self.write_line(line);
    }

    /// Record a failure line. Multi-line diagnostics are kept verbatim.
    pub fn failure(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        warn!("{line}");
        self.notify(line, true);
        self.write_line(line);
    }

    /// Write the footer and release the file.
    pub fn close(mut self) {
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        self.write_line(&format!("=== Run finished {stamp} ==="));
        if let Some(mut f) = self.file.take() {
            if let Err(e) = f.flush() {
                warn!("Failed to flush run log {}: {e}", self.path.display());
            }
        }
    }

    fn notify(&self, line: &str, failure: bool) {
        if let Some(ref cb) = self.listener {
            cb.on_status(line, failure);
        }
    }

    fn write_line(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = append(file, line) {
            warn!("Run log {} stopped accepting writes: {e}", self.path.display());
            self.file = None;
        }
    }
}

fn append(file: &mut File, line: &str) -> io::Result<()> {
    file.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}
