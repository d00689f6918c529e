//! CLI binary for eq2svg.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use eq2svg::{
    process_directory, process_document, BatchReport, DocumentReport, ItemError, PipelineConfig,
    PipelineProgressCallback, ProgressCallback, ToolStatus,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per document, re-armed for the
/// conversion stage. Every run-log line is echoed above the bar; failures
/// are printed in full, tool diagnostics included.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
    /// Items that errored in the current document.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn arm(&self, prefix: &str, len: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(len as u64);
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Some(old) = self.bar.lock().unwrap().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        match self.bar.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn inc(&self) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn item_failed(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.inc();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_status(&self, line: &str, failure: bool) {
        if failure {
            self.println(format!("  {} {}", red("✗"), red(line)));
        } else {
            self.println(format!("  {} {}", dim("·"), line));
        }
    }

    fn on_document_start(&self, input: &Path, equations: usize) {
        self.errors.store(0, Ordering::SeqCst);
        self.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{}: {equations} equation(s)", input.display()))
        ));
        self.arm("Compiling", equations);
    }

    fn on_equation_compiled(&self, _index: usize, _total: usize) {
        self.inc();
    }

    fn on_equation_skipped(&self, _index: usize, _total: usize) {
        self.inc();
    }

    fn on_equation_failed(&self, _index: usize, _total: usize, _error: &ItemError) {
        self.item_failed();
    }

    fn on_conversion_start(&self, pdfs: usize) {
        self.arm("Converting", pdfs);
    }

    fn on_svg_converted(&self, _svg: &Path) {
        self.inc();
    }

    fn on_svg_failed(&self, _pdf: &Path, _error: &ItemError) {
        self.item_failed();
    }

    fn on_document_complete(&self, report: &DocumentReport) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        let failed = self.errors.load(Ordering::SeqCst);
        eprintln!(
            "{} {} compiled, {} skipped, {} SVG(s)  {}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&report.stats.compiled.to_string()),
            report.stats.skipped,
            bold(&report.stats.converted.to_string()),
            if failed == 0 {
                dim(&format!("{}ms", report.stats.duration_ms))
            } else {
                red(&format!("{failed} failed"))
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One document; output goes to ./paper/
  eq2svg paper.tex

  # Explicit output directory
  eq2svg paper.tex -o build/equations

  # Every .tex file in the current directory, one output dir each
  eq2svg

  # Use LuaLaTeX and a custom Inkscape
  eq2svg --typesetter lualatex --vector-tool /opt/inkscape/bin/inkscape paper.tex

  # Recompile even when PDFs exist
  eq2svg --force paper.tex

  # Machine-readable report
  eq2svg --json paper.tex > report.json

OUTPUT LAYOUT:
  <out>/<i>.tex     standalone document for equation i (0-based)
  <out>/<i>.pdf     typeset equation
  <out>/<i>.svg     vector conversion
  <out>/eq2svg.log  append-only run log (all status lines, tool diagnostics)

EXTERNAL TOOLS:
  <typesetter> -output-directory <out> <out>/<i>.tex
  <vector-tool> --pdf-poppler --export-type=svg --export-filename=<out>/<i>.svg <out>/<i>.pdf

  The vector tool is looked up on PATH first, then at the platform's
  default install location (see --vector-tool-fallback).
"#;

/// Extract LaTeX equations and convert each to PDF and SVG.
#[derive(Parser, Debug)]
#[command(
    name = "eq2svg",
    version,
    about = "Extract LaTeX equation blocks and convert each to PDF and SVG",
    long_about = "Extract every \\begin{equation} block from a LaTeX document, compile each \
into a cropped standalone PDF with a typesetter (pdflatex by default), then convert every PDF \
in the output directory to SVG with a vector tool (Inkscape by default). Without INPUT, every \
.tex file in the current directory is processed in turn.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX document to process. Omit to process every document in the current directory.
    input: Option<PathBuf>,

    /// Output directory (default: input path without extension).
    #[arg(short, long, env = "EQ2SVG_OUTPUT", requires = "input")]
    output: Option<PathBuf>,

    /// Typesetter executable.
    #[arg(long, env = "EQ2SVG_TYPESETTER", default_value = "pdflatex")]
    typesetter: PathBuf,

    /// Vector-tool command, looked up on PATH.
    #[arg(long, env = "EQ2SVG_VECTOR_TOOL", default_value = "inkscape")]
    vector_tool: PathBuf,

    /// Vector-tool path tried when the command is not on PATH.
    #[arg(long, env = "EQ2SVG_VECTOR_TOOL_FALLBACK", default_value = eq2svg::DEFAULT_VECTOR_TOOL_FALLBACK)]
    vector_tool_fallback: PathBuf,

    /// Document extension (also used for generated units).
    #[arg(long = "ext", env = "EQ2SVG_EXT", default_value = "tex")]
    extension: String,

    /// Run-log file name inside the output directory.
    #[arg(long, env = "EQ2SVG_LOG_NAME", default_value = "eq2svg.log")]
    log_name: String,

    /// Recompile equations even when their PDF already exists.
    #[arg(long, env = "EQ2SVG_FORCE")]
    force: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "EQ2SVG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "EQ2SVG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EQ2SVG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EQ2SVG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the bar is active the progress callback echoes every run-log
    // line above it, so library INFO/WARN events would print twice.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    match cli.input {
        Some(ref input) => {
            let report = process_document(input, cli.output.as_deref(), &config)
                .await
                .with_context(|| format!("Failed to process {}", input.display()))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            } else if !cli.quiet && !show_progress {
                print_summary(&report);
            }
        }
        None => {
            let cwd = std::env::current_dir().context("Cannot determine current directory")?;
            let batch = process_directory(&cwd, &config)
                .await
                .context("Batch processing failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&batch).context("Failed to serialise report")?
                );
            } else if !cli.quiet {
                print_batch_summary(&batch, show_progress);
            }

            if !batch.failures.is_empty() {
                anyhow::bail!(
                    "{}/{} document(s) could not be processed",
                    batch.failures.len(),
                    batch.failures.len() + batch.documents.len()
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let fallback = if cli.vector_tool_fallback.as_os_str().is_empty() {
        None
    } else {
        Some(cli.vector_tool_fallback.clone())
    };

    let mut builder = PipelineConfig::builder()
        .typesetter(&cli.typesetter)
        .vector_tool(&cli.vector_tool)
        .vector_tool_fallback(fallback)
        .source_extension(&cli.extension)
        .log_file_name(&cli.log_name)
        .skip_existing(!cli.force);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn tool_line(status: &ToolStatus) -> String {
    match status {
        ToolStatus::Available { path, version } => format!("{} ({})", path.display(), version),
        ToolStatus::Unavailable { detail } => red(detail),
    }
}

fn print_summary(report: &DocumentReport) {
    let s = &report.stats;
    eprintln!("Output:      {}", report.output_dir.display());
    if let Some(ref log) = report.log_path {
        eprintln!("Log:         {}", log.display());
    }
    eprintln!("Typesetter:  {}", tool_line(&report.typesetter));
    eprintln!("Vector tool: {}", tool_line(&report.vector_tool));
    eprintln!(
        "Equations:   {} found, {} compiled, {} skipped, {} failed",
        s.equations, s.compiled, s.skipped, s.compile_failed
    );
    eprintln!(
        "SVG:         {} PDF(s), {} converted, {} failed",
        s.pdfs_found, s.converted, s.convert_failed
    );
}

fn print_batch_summary(batch: &BatchReport, progress_shown: bool) {
    if !progress_shown {
        for report in &batch.documents {
            eprintln!("{}", bold(&report.input.display().to_string()));
            print_summary(report);
        }
    }
    for failure in &batch.failures {
        eprintln!("{} {}: {}", red("✘"), failure.input.display(), failure.error);
    }
    eprintln!(
        "{} document(s) processed, {} failed",
        batch.documents.len(),
        batch.failures.len()
    );
}
