//! Compilation units: one self-contained LaTeX document per equation.
//!
//! ## Layout
//!
//! ```text
//! \documentclass[preview]{standalone}   page shrinks to the content
//! \usepackage{...}                       fixed math/font packages
//! <macro lines, verbatim, in order>
//! \begin{document}
//! <wrapped equation>                     never numbered
//! \end{document}
//! ```
//!
//! A body that opens its own environment (`aligned`, `cases`, …) goes inside
//! `equation*`; anything else is typeset as `$\displaystyle …$`. Any
//! `\label{…}` is removed in both cases so the artefact holds the
//! mathematics only.

use crate::error::ItemError;
use crate::pipeline::extract::{Equation, MacroDefinition};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Class line and package imports, in order.
pub const PREAMBLE: &[&str] = &[
    r"\documentclass[preview]{standalone}",
    r"\usepackage{amsmath}",
    r"\usepackage{amssymb}",
    r"\usepackage{amsfonts}",
    r"\usepackage{bm}",
    r"\usepackage[noabbrev]{cleveref}",
];

static RE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\label\{[^}]*\}").unwrap());

/// Build the full unit text for one equation.
pub fn build(equation: &Equation, macros: &[MacroDefinition]) -> String {
    let mut unit = String::with_capacity(256 + equation.body.len());

    for line in PREAMBLE {
        unit.push_str(line);
        unit.push('\n');
    }
    for m in macros {
        unit.push_str(m.as_str());
        unit.push('\n');
    }

    unit.push_str("\\begin{document}\n");
    unit.push_str(&wrap_body(&equation.body));
    unit.push_str("\\end{document}\n");
    unit
}

/// Wrap an equation body so it renders without a number.
pub fn wrap_body(body: &str) -> String {
    let body = RE_LABEL.replace_all(body, "");
    let body = body.trim();
    if has_nested_environment(body) {
        format!("\\begin{{equation*}}\n{body}\n\\end{{equation*}}\n")
    } else {
        format!("$\\displaystyle {body}$\n")
    }
}

/// True when the body opens an environment of its own.
pub fn has_nested_environment(body: &str) -> bool {
    body.contains("\\begin{")
}

/// Path of the unit file for `index`: `<dir>/<index>.<ext>`.
pub fn unit_path(output_dir: &Path, index: usize, extension: &str) -> PathBuf {
    output_dir.join(format!("{index}.{extension}"))
}

/// Build the unit and write it, replacing any previous file of that name.
pub async fn write_unit(
    output_dir: &Path,
    extension: &str,
    equation: &Equation,
    macros: &[MacroDefinition],
) -> Result<PathBuf, ItemError> {
    let path = unit_path(output_dir, equation.index, extension);
    let text = build(equation, macros);

    tokio::fs::write(&path, text.as_bytes())
        .await
        .map_err(|e| ItemError::UnitWriteFailed {
            index: equation.index,
            path: path.clone(),
            detail: e.to_string(),
        })?;

    debug!("Wrote compilation unit {} ({} bytes)", path.display(), text.len());
    Ok(path)
}
