//! Result types returned by the pipeline.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one extracted equation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquationOutcome {
    /// The typesetter ran and produced the PDF.
    Compiled,
    /// The PDF already existed; the typesetter was not invoked.
    Skipped,
    /// No PDF for this equation.
    Failed(ItemError),
}

/// Result for one equation index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationResult {
    /// 0-based position in the document; also the output file stem.
    pub index: usize,
    /// Path of the generated compilation unit.
    pub unit_path: PathBuf,
    /// Expected PDF path (`<dir>/<index>.pdf`).
    pub pdf_path: PathBuf,
    pub outcome: EquationOutcome,
}

/// What happened to one PDF found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionOutcome {
    Converted { svg: PathBuf },
    Failed(ItemError),
}

/// Result for one PDF → SVG conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub pdf_path: PathBuf,
    pub outcome: ConversionOutcome,
}

/// Availability of an external tool as determined by its version probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolStatus {
    /// The probe succeeded at `path`; `version` is the first output line.
    Available { path: PathBuf, version: String },
    /// Every candidate failed; the message is the `ToolUnavailable` text.
    Unavailable { detail: String },
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ToolStatus::Available { .. })
    }
}

/// Everything a single document run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Run-log path; `None` when the log file could not be opened.
    pub log_path: Option<PathBuf>,
    pub macro_count: usize,
    pub typesetter: ToolStatus,
    pub vector_tool: ToolStatus,
    pub equations: Vec<EquationResult>,
    pub conversions: Vec<ConversionResult>,
    pub stats: RunStats,
}

impl DocumentReport {
    /// True when every equation has a PDF and every PDF an SVG.
    pub fn is_complete_success(&self) -> bool {
        self.stats.compile_failed == 0 && self.stats.convert_failed == 0
    }
}

/// Aggregate counters for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub equations: usize,
    pub compiled: usize,
    pub skipped: usize,
    pub compile_failed: usize,
    pub pdfs_found: usize,
    pub converted: usize,
    pub convert_failed: usize,
    pub duration_ms: u64,
}

impl RunStats {
    /// Derive the counters from the per-item results.
    pub fn tally(equations: &[EquationResult], conversions: &[ConversionResult]) -> Self {
        let count = |pred: fn(&EquationOutcome) -> bool| {
            equations.iter().filter(|e| pred(&e.outcome)).count()
        };
        let converted = conversions
            .iter()
            .filter(|c| matches!(c.outcome, ConversionOutcome::Converted { .. }))
            .count();
        Self {
            equations: equations.len(),
            compiled: count(|o| matches!(o, EquationOutcome::Compiled)),
            skipped: count(|o| matches!(o, EquationOutcome::Skipped)),
            compile_failed: count(|o| matches!(o, EquationOutcome::Failed(_))),
            pdfs_found: conversions.len(),
            converted,
            convert_failed: conversions.len() - converted,
            duration_ms: 0,
        }
    }
}

/// A document in batch mode that could not be processed at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Results of processing every document in a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(index: usize, outcome: EquationOutcome) -> EquationResult {
        EquationResult {
            index,
            unit_path: PathBuf::from(format!("out/{index}.tex")),
            pdf_path: PathBuf::from(format!("out/{index}.pdf")),
            outcome,
        }
    }

    #[test]
    fn tally_counts_each_outcome() {
        let equations = vec![
            eq(0, EquationOutcome::Compiled),
            eq(1, EquationOutcome::Skipped),
            eq(
                2,
                EquationOutcome::Failed(ItemError::PdfMissing {
                    index: 2,
                    path: PathBuf::from("out/2.pdf"),
                }),
            ),
        ];
        let conversions = vec![
            ConversionResult {
                pdf_path: PathBuf::from("out/0.pdf"),
                outcome: ConversionOutcome::Converted {
                    svg: PathBuf::from("out/0.svg"),
                },
            },
            ConversionResult {
                pdf_path: PathBuf::from("out/1.pdf"),
                outcome: ConversionOutcome::Failed(ItemError::ConversionFailed {
                    pdf: PathBuf::from("out/1.pdf"),
                    status: "exit code 1".into(),
                    output: String::new(),
                }),
            },
        ];

        let stats = RunStats::tally(&equations, &conversions);
        assert_eq!(stats.equations, 3);
        assert_eq!(stats.compiled, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.compile_failed, 1);
        assert_eq!(stats.pdfs_found, 2);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.convert_failed, 1);
    }
}
