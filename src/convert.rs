//! Document orchestration: extract, build units, compile, convert.
//!
//! One call to [`process_document`] drives a single input end-to-end:
//!
//! 1. resolve and create the output directory (fatal on failure)
//! 2. open the run log
//! 3. probe the typesetter (reported, never fatal)
//! 4. read the document (fatal on failure) and extract equations + macros
//! 5. per equation: write `<i>.<ext>`, then compile to `<i>.pdf` unless it
//!    already exists
//! 6. resolve the vector tool (bare name, then fallback path)
//! 7. convert **every** PDF in the output directory to SVG, including ones
//!    this run did not produce
//! 8. close the run log
//!
//! Everything runs strictly in sequence. Per-item failures are logged with
//! the tool's own diagnostics and the loop carries on.

use crate::config::PipelineConfig;
use crate::error::{Eq2SvgError, ItemError};
use crate::output::{
    BatchReport, ConversionOutcome, ConversionResult, DocumentFailure, DocumentReport,
    EquationOutcome, EquationResult, RunStats, ToolStatus,
};
use crate::pipeline::extract::{self, Equation, MacroDefinition};
use crate::pipeline::tool::{
    display_command, typesetter_args, vector_tool_args, SystemRunner, ToolResolver, ToolRunner,
};
use crate::pipeline::{input, unit};
use crate::runlog::RunLog;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Process one document with the system's real tools.
///
/// `output_dir` overrides the default `<input dir>/<input stem>`.
///
/// # Returns
/// `Ok(DocumentReport)` whenever the document was read and the output
/// directory exists, even if every equation failed (check `report.stats`).
///
/// # Errors
/// Only two failures are fatal:
/// - the output directory cannot be created
/// - the input document cannot be read
pub async fn process_document(
    input_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<DocumentReport, Eq2SvgError> {
    process_document_with(&SystemRunner, input_path, output_dir, config).await
}

/// Synchronous wrapper around [`process_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_document_sync(
    input_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<DocumentReport, Eq2SvgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Eq2SvgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_document(input_path, output_dir, config))
}

/// Process every document in `dir` with the system's real tools.
pub async fn process_directory(
    dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<BatchReport, Eq2SvgError> {
    process_directory_with(&SystemRunner, dir, config).await
}

/// Batch mode: every `*.<source_extension>` file directly inside `dir`, one
/// after another, each with its own output directory and run log.
///
/// A document that fails fatally is recorded in
/// [`BatchReport::failures`] and the batch moves on.
///
/// # Errors
/// Only when `dir` itself cannot be listed.
pub async fn process_directory_with<R: ToolRunner>(
    runner: &R,
    dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<BatchReport, Eq2SvgError> {
    let dir = dir.as_ref();
    let documents = input::discover_documents(dir, &config.source_extension).await?;
    info!(
        "Found {} .{} document(s) in {}",
        documents.len(),
        config.source_extension,
        dir.display()
    );

    let mut batch = BatchReport::default();
    for doc in documents {
        match process_document_with(runner, &doc, None, config).await {
            Ok(report) => batch.documents.push(report),
            Err(e) => {
                error!("{}: {}", doc.display(), e);
                batch.failures.push(DocumentFailure {
                    input: doc,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}

/// Process one document with an arbitrary [`ToolRunner`].
pub async fn process_document_with<R: ToolRunner>(
    runner: &R,
    input_path: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<DocumentReport, Eq2SvgError> {
    let start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Processing {}", input_path.display());

    // ── Step 1: Output directory ─────────────────────────────────────────
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input::default_output_dir(input_path));
    let created = input::ensure_output_dir(&output_dir).await?;

    // ── Step 2: Run log ──────────────────────────────────────────────────
    let mut log = RunLog::open(
        output_dir.join(&config.log_file_name),
        config.progress_callback.clone(),
    );
    if created {
        log.status(format!("Created output directory {}", output_dir.display()));
    } else {
        log.status(format!("Using existing output directory {}", output_dir.display()));
    }

    // ── Step 3: Typesetter probe ─────────────────────────────────────────
    let typesetter = ToolResolver::new("typesetter", vec![config.typesetter.clone()]);
    let typesetter_status = probe(runner, &typesetter, &mut log).await;

    // ── Step 4: Read + extract ───────────────────────────────────────────
    let document = match input::read_document(input_path).await {
        Ok(text) => text,
        Err(e) => {
            log.failure(format!("Cannot read {}: {}", input_path.display(), e));
            log.close();
            return Err(e);
        }
    };
    let extraction = extract::extract(&document);
    log.status(format!(
        "Found {} equation(s) and {} macro definition(s) in {}",
        extraction.equations.len(),
        extraction.macros.len(),
        input_path.display()
    ));
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(input_path, extraction.equations.len());
    }

    // ── Step 5: Units + compilation ──────────────────────────────────────
    let total = extraction.equations.len();
    let mut equations = Vec::with_capacity(total);
    for equation in &extraction.equations {
        let result = compile_equation(
            runner,
            equation,
            &extraction.macros,
            &output_dir,
            config,
            &mut log,
        )
        .await;

        if let Some(ref cb) = config.progress_callback {
            match &result.outcome {
                EquationOutcome::Compiled => cb.on_equation_compiled(result.index, total),
                EquationOutcome::Skipped => cb.on_equation_skipped(result.index, total),
                EquationOutcome::Failed(e) => cb.on_equation_failed(result.index, total, e),
            }
        }
        equations.push(result);
    }

    // ── Step 6: Vector-tool resolution ───────────────────────────────────
    let vector_tool = ToolResolver::new("vector tool", config.vector_tool_candidates());
    let vector_status = probe(runner, &vector_tool, &mut log).await;
    let vector_path = match &vector_status {
        ToolStatus::Available { path, .. } => path.clone(),
        // Nothing answered; still attempt each PDF so every failure is reported.
        ToolStatus::Unavailable { .. } => config.vector_tool.clone(),
    };

    // ── Step 7: Convert every PDF in the directory ───────────────────────
    let conversions = convert_pdfs(runner, &vector_path, &output_dir, config, &mut log).await;

    // ── Step 8: Summary + close ──────────────────────────────────────────
    let mut stats = RunStats::tally(&equations, &conversions);
    stats.duration_ms = start.elapsed().as_millis() as u64;
    log.status(format!(
        "Finished {}: {} compiled, {} skipped, {} failed; {} SVG(s) written, {} conversion(s) failed ({}ms)",
        input_path.display(),
        stats.compiled,
        stats.skipped,
        stats.compile_failed,
        stats.converted,
        stats.convert_failed,
        stats.duration_ms
    ));
    let log_path = log.path().map(Path::to_path_buf);
    log.close();

    let report = DocumentReport {
        input: input_path.to_path_buf(),
        output_dir,
        log_path,
        macro_count: extraction.macros.len(),
        typesetter: typesetter_status,
        vector_tool: vector_status,
        equations,
        conversions,
        stats,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(&report);
    }

    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Probe a tool and log the outcome.
async fn probe<R: ToolRunner>(runner: &R, resolver: &ToolResolver, log: &mut RunLog) -> ToolStatus {
    match resolver.resolve(runner).await {
        Ok(tool) => {
            log.status(format!("Tool check passed: {tool}"));
            ToolStatus::Available {
                path: tool.path,
                version: tool.version,
            }
        }
        Err(e) => {
            log.failure(format!("Tool check failed: {e}"));
            ToolStatus::Unavailable {
                detail: e.to_string(),
            }
        }
    }
}

/// Write the unit for one equation and compile it unless its PDF exists.
async fn compile_equation<R: ToolRunner>(
    runner: &R,
    equation: &Equation,
    macros: &[MacroDefinition],
    output_dir: &Path,
    config: &PipelineConfig,
    log: &mut RunLog,
) -> EquationResult {
    let index = equation.index;
    let unit_path = unit::unit_path(output_dir, index, &config.source_extension);
    let pdf_path = output_dir.join(format!("{index}.pdf"));
    let result = |outcome| EquationResult {
        index,
        unit_path: unit_path.clone(),
        pdf_path: pdf_path.clone(),
        outcome,
    };

    if let Err(e) = unit::write_unit(output_dir, &config.source_extension, equation, macros).await {
        log.failure(e.to_string());
        return result(EquationOutcome::Failed(e));
    }

    if config.skip_existing && is_file(&pdf_path).await {
        log.status(format!(
            "Equation {index}: {} already exists, skipping compilation",
            pdf_path.display()
        ));
        return result(EquationOutcome::Skipped);
    }

    let args = typesetter_args(output_dir, &unit_path);
    debug!("{}", display_command(&config.typesetter, &args));
    let out = runner.run(&config.typesetter, &args).await;

    if !out.success() {
        let err = ItemError::CompilationFailed {
            index,
            status: out.status_text(),
            output: out.output,
        };
        log.failure(err.to_string());
        return result(EquationOutcome::Failed(err));
    }

    if !is_file(&pdf_path).await {
        let err = ItemError::PdfMissing {
            index,
            path: pdf_path.clone(),
        };
        log.failure(err.to_string());
        return result(EquationOutcome::Failed(err));
    }

    log.status(format!(
        "Equation {index} compiled successfully: {}",
        pdf_path.display()
    ));
    result(EquationOutcome::Compiled)
}

/// Convert every `*.pdf` currently in `output_dir`.
async fn convert_pdfs<R: ToolRunner>(
    runner: &R,
    vector_tool: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    log: &mut RunLog,
) -> Vec<ConversionResult> {
    let pdfs = match input::list_pdfs(output_dir).await {
        Ok(pdfs) => pdfs,
        Err(e) => {
            log.failure(format!("Cannot list PDFs: {e}"));
            Vec::new()
        }
    };
    log.status(format!(
        "Converting {} PDF file(s) in {}",
        pdfs.len(),
        output_dir.display()
    ));
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(pdfs.len());
    }

    let mut results = Vec::with_capacity(pdfs.len());
    for pdf in pdfs {
        let outcome = convert_one(runner, vector_tool, &pdf).await;
        match &outcome {
            ConversionOutcome::Converted { svg } => {
                log.status(format!("{} converted to SVG: {}", pdf.display(), svg.display()));
                if let Some(ref cb) = config.progress_callback {
                    cb.on_svg_converted(svg);
                }
            }
            ConversionOutcome::Failed(e) => {
                log.failure(e.to_string());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_svg_failed(&pdf, e);
                }
            }
        }
        results.push(ConversionResult {
            pdf_path: pdf,
            outcome,
        });
    }
    results
}

async fn convert_one<R: ToolRunner>(runner: &R, vector_tool: &Path, pdf: &Path) -> ConversionOutcome {
    let svg = svg_path_for(pdf);
    let args = vector_tool_args(pdf, &svg);
    debug!("{}", display_command(vector_tool, &args));
    let out = runner.run(vector_tool, &args).await;

    if !out.success() {
        return ConversionOutcome::Failed(ItemError::ConversionFailed {
            pdf: pdf.to_path_buf(),
            status: out.status_text(),
            output: out.output,
        });
    }
    if !is_file(&svg).await {
        return ConversionOutcome::Failed(ItemError::ConversionFailed {
            pdf: pdf.to_path_buf(),
            status: out.status_text(),
            output: format!("no SVG written to {}\n{}", svg.display(), out.output),
        });
    }
    ConversionOutcome::Converted { svg }
}

/// Same directory and stem as the PDF, `.svg` extension.
pub fn svg_path_for(pdf: &Path) -> PathBuf {
    pdf.with_extension("svg")
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
