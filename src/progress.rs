//! Progress-callback trait for per-equation pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the pipeline compiles equations and converts PDFs.
//!
//! Every line written to the run log is also handed to
//! [`PipelineProgressCallback::on_status`], verbatim. The remaining hooks
//! carry the same milestones in structured form so a front-end (the CLI
//! progress bar, a test harness) can react without parsing log lines.
//!
//! # Example
//!
//! ```rust
//! use eq2svg::{PipelineConfig, PipelineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     compiled: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_equation_compiled(&self, index: usize, total: usize) {
//!         self.compiled.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("equation {}/{} compiled", index + 1, total);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { compiled: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ItemError;
use crate::output::DocumentReport;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes one document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Equation indices are 0-based, matching the output
/// file stems.
pub trait PipelineProgressCallback: Send + Sync {
    /// A status or failure line, exactly as written to the run log.
    ///
    /// Failure lines carry the tool's full diagnostics, possibly over several
    /// lines.
    fn on_status(&self, line: &str, failure: bool) {
        let _ = (line, failure);
    }

    /// Called once per document, after extraction.
    fn on_document_start(&self, input: &Path, equations: usize) {
        let _ = (input, equations);
    }

    /// The typesetter produced `<index>.pdf`.
    fn on_equation_compiled(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// `<index>.pdf` already existed, so the typesetter was not invoked.
    fn on_equation_skipped(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// The equation produced no PDF.
    fn on_equation_failed(&self, index: usize, total: usize, error: &ItemError) {
        let _ = (index, total, error);
    }

    /// Called before the conversion stage with the number of PDFs found.
    fn on_conversion_start(&self, pdfs: usize) {
        let _ = pdfs;
    }

    /// An SVG was written.
    fn on_svg_converted(&self, svg: &Path) {
        let _ = svg;
    }

    /// A PDF could not be converted.
    fn on_svg_failed(&self, pdf: &Path, error: &ItemError) {
        let _ = (pdf, error);
    }

    /// Called once after the log is closed.
    fn on_document_complete(&self, report: &DocumentReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
