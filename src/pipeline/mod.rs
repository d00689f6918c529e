//! Pipeline stages for equation extraction and conversion.
//!
//! Each submodule implements exactly one step; [`crate::convert`] strings
//! them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ unit ──▶ tool (typesetter) ──▶ tool (vector)
//! (.tex)    (bodies,    (<i>.tex)   (<i>.pdf)            (<i>.svg)
//!            macros)
//! ```
//!
//! 1. [`input`]   — read the document, derive/create the output directory,
//!    discover documents and PDFs on disk
//! 2. [`extract`] — equation bodies and macro-definition lines
//! 3. [`unit`]    — one standalone LaTeX document per equation
//! 4. [`tool`]    — run external executables, probe and resolve tool paths

pub mod extract;
pub mod input;
pub mod tool;
pub mod unit;
