//! # eq2svg
//!
//! Pull every `\begin{equation}` block out of a LaTeX document, typeset each
//! one on its own into a tightly cropped PDF, and convert those PDFs to SVG.
//!
//! ## Pipeline Overview
//!
//! ```text
//! paper.tex
//!  │
//!  ├─ 1. Output   create paper/ next to the input, open paper/eq2svg.log
//!  ├─ 2. Probe    <typesetter> --version
//!  ├─ 3. Extract  equation bodies + \newcommand-style macro lines
//!  ├─ 4. Units    paper/<i>.tex, one standalone document per equation
//!  ├─ 5. Compile  <typesetter> -output-directory paper paper/<i>.tex
//!  │              (skipped when paper/<i>.pdf already exists)
//!  ├─ 6. Resolve  inkscape on PATH, else the platform install path
//!  └─ 7. Convert  every paper/*.pdf → paper/*.svg
//! ```
//!
//! Failures of a single equation or PDF are logged with the tool's own
//! diagnostics and never stop the run. Only an unreadable input or an
//! output directory that cannot be created is fatal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eq2svg::{process_document, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let report = process_document("paper.tex", None, &config).await?;
//!     eprintln!(
//!         "{} compiled, {} skipped, {} SVGs",
//!         report.stats.compiled, report.stats.skipped, report.stats.converted
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `eq2svg` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! eq2svg = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod runlog;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_VECTOR_TOOL_FALLBACK};
pub use convert::{
    process_directory, process_directory_with, process_document, process_document_sync,
    process_document_with, svg_path_for,
};
pub use error::{Eq2SvgError, ItemError, ToolUnavailable};
pub use output::{
    BatchReport, ConversionOutcome, ConversionResult, DocumentFailure, DocumentReport,
    EquationOutcome, EquationResult, RunStats, ToolStatus,
};
pub use pipeline::extract::{extract, Equation, Extraction, MacroDefinition};
pub use pipeline::tool::{SystemRunner, ToolOutput, ToolResolver, ToolRunner};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use runlog::RunLog;
