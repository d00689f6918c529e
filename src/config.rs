//! Configuration types for equation extraction and conversion.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Tool names, the document extension and the
//! run-log name live in one struct so a batch run can reuse the same config
//! for every document it discovers.

use crate::error::Eq2SvgError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Fallback location of the vector tool on Windows.
#[cfg(target_os = "windows")]
pub const DEFAULT_VECTOR_TOOL_FALLBACK: &str = r"C:\Program Files\Inkscape\bin\inkscape.exe";

/// Fallback location of the vector tool on macOS.
#[cfg(target_os = "macos")]
pub const DEFAULT_VECTOR_TOOL_FALLBACK: &str = "/Applications/Inkscape.app/Contents/MacOS/inkscape";

/// Fallback location of the vector tool on other platforms.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_VECTOR_TOOL_FALLBACK: &str = "/usr/bin/inkscape";

/// Configuration for one or more document runs.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use eq2svg::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .typesetter("lualatex")
///     .log_file_name("run.log")
///     .build()
///     .unwrap();
/// assert_eq!(config.source_extension, "tex");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Typesetter executable. Default: `pdflatex`.
    ///
    /// Invoked as `<typesetter> -output-directory <dir> <unit_file>` and
    /// probed with `--version` once per document.
    pub typesetter: PathBuf,

    /// Vector-tool command name, looked up on `PATH`. Default: `inkscape`.
    pub vector_tool: PathBuf,

    /// Absolute vector-tool path tried when the bare command does not answer
    /// its version probe. Default: [`DEFAULT_VECTOR_TOOL_FALLBACK`].
    pub vector_tool_fallback: Option<PathBuf>,

    /// Extension of input documents and of generated compilation units,
    /// without the dot. Default: `tex`.
    pub source_extension: String,

    /// Name of the run log written inside each output directory.
    /// Default: `eq2svg.log`.
    pub log_file_name: String,

    /// Skip compiling equations whose PDF already exists. Default: true.
    ///
    /// There is no staleness check: a changed equation at the same index keeps
    /// its old PDF until the file is removed or this is turned off.
    pub skip_existing: bool,

    /// Per-equation event sink. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            typesetter: PathBuf::from("pdflatex"),
            vector_tool: PathBuf::from("inkscape"),
            vector_tool_fallback: Some(PathBuf::from(DEFAULT_VECTOR_TOOL_FALLBACK)),
            source_extension: "tex".to_string(),
            log_file_name: "eq2svg.log".to_string(),
            skip_existing: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("typesetter", &self.typesetter)
            .field("vector_tool", &self.vector_tool)
            .field("vector_tool_fallback", &self.vector_tool_fallback)
            .field("source_extension", &self.source_extension)
            .field("log_file_name", &self.log_file_name)
            .field("skip_existing", &self.skip_existing)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Vector-tool candidates in probe order: bare command, then fallback.
    pub fn vector_tool_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![self.vector_tool.clone()];
        if let Some(ref fallback) = self.vector_tool_fallback {
            if fallback != &self.vector_tool {
                candidates.push(fallback.clone());
            }
        }
        candidates
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn typesetter(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.typesetter = path.into();
        self
    }

    pub fn vector_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.vector_tool = path.into();
        self
    }

    /// Set the fallback path, or `None` to probe the bare command only.
    pub fn vector_tool_fallback(mut self, path: Option<PathBuf>) -> Self {
        self.config.vector_tool_fallback = path;
        self
    }

    /// Leading dots are dropped: `".tex"` and `"tex"` are equivalent.
    pub fn source_extension(mut self, ext: impl Into<String>) -> Self {
        let ext: String = ext.into();
        self.config.source_extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn log_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.log_file_name = name.into();
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Eq2SvgError> {
        let c = &self.config;
        if c.typesetter.as_os_str().is_empty() {
            return Err(Eq2SvgError::InvalidConfig(
                "Typesetter path must not be empty".into(),
            ));
        }
        if c.vector_tool.as_os_str().is_empty() {
            return Err(Eq2SvgError::InvalidConfig(
                "Vector tool path must not be empty".into(),
            ));
        }
        if c.source_extension.is_empty() || c.source_extension.contains(['.', '/', '\\']) {
            return Err(Eq2SvgError::InvalidConfig(format!(
                "Source extension must be a bare extension like 'tex', got '{}'",
                c.source_extension
            )));
        }
        if c.log_file_name.is_empty() || c.log_file_name.contains(['/', '\\']) {
            return Err(Eq2SvgError::InvalidConfig(format!(
                "Log file name must be a plain file name, got '{}'",
                c.log_file_name
            )));
        }
        Ok(self.config)
    }
}
