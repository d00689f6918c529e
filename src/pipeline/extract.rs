//! Equation and macro extraction from raw document text.
//!
//! Only the literal `\begin{equation}` … `\end{equation}` pair is
//! recognised. Every opening marker pairs with the nearest following closing
//! marker. An opening marker that is followed by another opening marker
//! before any closing one is unclosed and is dropped, so a document with a
//! stray `\begin{equation}` extracts exactly as if the stray marker were
//! absent.
//!
//! Macro definitions are collected by a separate line scan, independent of
//! where equations sit.

use once_cell::sync::Lazy;
use regex::Regex;

/// One `\begin{equation}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    /// 0-based position among the document's equations.
    pub index: usize,
    /// Text between the markers, trimmed.
    pub body: String,
}

/// A macro-declaration line, copied verbatim into every compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition(pub String);

impl MacroDefinition {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything the later stages need from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub equations: Vec<Equation>,
    pub macros: Vec<MacroDefinition>,
}

static RE_EQUATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:begin|end)\{equation\}").unwrap());

static RE_MACRO_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\\(?:newcommand|renewcommand|providecommand|DeclareMathOperator|def)(?:[^A-Za-z].*)?$",
    )
    .unwrap()
});

/// Extract both equations and macro definitions.
pub fn extract(document: &str) -> Extraction {
    Extraction {
        equations: extract_equations(document),
        macros: extract_macros(document),
    }
}

/// Return the equation bodies in document order.
///
/// A document without equations yields an empty vector.
pub fn extract_equations(document: &str) -> Vec<Equation> {
    let mut equations = Vec::new();
    let mut open: Option<usize> = None;

    for marker in RE_EQUATION_MARKER.find_iter(document) {
        if marker.as_str().starts_with("\\begin") {
            // A second opener before any closer drops the first one.
            open = Some(marker.end());
        } else if let Some(start) = open.take() {
            equations.push(Equation {
                index: equations.len(),
                body: document[start..marker.start()].trim().to_string(),
            });
        }
    }

    equations
}

/// Return every macro-declaration line in document order.
///
/// A line qualifies when it starts (column 0) with `\newcommand`,
/// `\renewcommand`, `\providecommand`, `\DeclareMathOperator` or `\def`.
/// The whole line is kept, minus a trailing carriage return.
pub fn extract_macros(document: &str) -> Vec<MacroDefinition> {
    RE_MACRO_LINE
        .find_iter(document)
        .map(|m| MacroDefinition(m.as_str().trim_end_matches('\r').to_string()))
        .collect()
}
