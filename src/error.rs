//! Error types for the eq2svg library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`Eq2SvgError`] — **Fatal**: the document cannot be processed at all
//!   (input unreadable, output directory cannot be created). Returned as
//!   `Err(Eq2SvgError)` from the top-level `process_*` functions.
//!
//! * [`ItemError`] — **Non-fatal**: a single equation or PDF failed (bad
//!   LaTeX, converter crash) but every other item is still attempted. Stored
//!   inside [`crate::output::EquationOutcome`] and
//!   [`crate::output::ConversionOutcome`].
//!
//! * [`ToolUnavailable`] — a version probe failed for every candidate path.
//!   Reported in the [`crate::output::DocumentReport`]; processing continues
//!   and the per-item invocations fail (and are reported) individually.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the eq2svg library.
#[derive(Debug, Error)]
pub enum Eq2SvgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("Input document not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the document.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The document exists but could not be read as text.
    #[error("Failed to read input document '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The working directory could not be listed in batch mode.
    #[error("Failed to scan '{path}' for documents: {source}")]
    DirectoryScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output directory did not exist and could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single equation or PDF.
///
/// The pipeline records it and moves on to the next item.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ItemError {
    /// The compilation unit could not be written to disk.
    #[error("Equation {index}: failed to write '{path}': {detail}")]
    UnitWriteFailed {
        index: usize,
        path: PathBuf,
        detail: String,
    },

    /// The typesetter exited non-zero or could not be launched.
    ///
    /// `output` holds the tool's captured diagnostics verbatim.
    #[error("Equation {index}: compilation failed ({status})\n{output}")]
    CompilationFailed {
        index: usize,
        status: String,
        output: String,
    },

    /// The typesetter reported success but no PDF appeared.
    #[error("Equation {index}: typesetter succeeded but '{path}' was not produced")]
    PdfMissing { index: usize, path: PathBuf },

    /// The vector tool exited non-zero or could not be launched.
    #[error("'{pdf}': SVG conversion failed ({status})\n{output}")]
    ConversionFailed {
        pdf: PathBuf,
        status: String,
        output: String,
    },
}

/// No candidate for an external tool answered its version probe.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{tool} is unavailable (tried {}): {detail}", display_candidates(.tried))]
pub struct ToolUnavailable {
    /// Human name of the tool, e.g. "typesetter".
    pub tool: String,
    /// Every path that was probed, in order.
    pub tried: Vec<PathBuf>,
    /// Diagnostic from the last failed probe.
    pub detail: String,
}

fn display_candidates(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_failure_keeps_diagnostics_verbatim() {
        let e = ItemError::CompilationFailed {
            index: 3,
            status: "exit code 1".into(),
            output: "! Undefined control sequence.\nl.7 \\foo".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Equation 3"), "got: {msg}");
        assert!(msg.contains("! Undefined control sequence.\nl.7 \\foo"));
    }

    #[test]
    fn tool_unavailable_lists_every_candidate() {
        let e = ToolUnavailable {
            tool: "vector tool".into(),
            tried: vec![PathBuf::from("inkscape"), PathBuf::from("/usr/bin/inkscape")],
            detail: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'inkscape', '/usr/bin/inkscape'"), "got: {msg}");
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn output_dir_failure_names_path() {
        let e = Eq2SvgError::OutputDirFailed {
            path: PathBuf::from("/nope/paper"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/nope/paper"));
    }

    #[test]
    fn item_error_serialises() {
        let e = ItemError::PdfMissing {
            index: 0,
            path: PathBuf::from("out/0.pdf"),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: ItemError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
