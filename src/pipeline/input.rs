//! Input resolution: read the source document and decide where output goes.
//!
//! A document that cannot be read is fatal for that document (there is
//! nothing to extract), so this stage maps I/O failures to the matching
//! [`Eq2SvgError`] variants. Non-UTF-8 bytes are replaced rather than
//! rejected; the equation scan only cares about ASCII markers.

use crate::error::Eq2SvgError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read the whole document as text.
pub async fn read_document(path: &Path) -> Result<String, Eq2SvgError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => Eq2SvgError::InputNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Eq2SvgError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Eq2SvgError::InputUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Output directory derived from the input: a sibling named after its stem.
///
/// `papers/thesis.tex` → `papers/thesis`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    match input.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Create the output directory if it does not exist yet.
///
/// Returns `true` when the directory was created by this call.
pub async fn ensure_output_dir(dir: &Path) -> Result<bool, Eq2SvgError> {
    if tokio::fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(false);
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Eq2SvgError::OutputDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    Ok(true)
}

/// List documents with the given extension directly inside `dir`, sorted.
pub async fn discover_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Eq2SvgError> {
    let scan_err = |e| Eq2SvgError::DirectoryScanFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(scan_err)?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && has_extension(&path, extension) {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

/// List `*.pdf` files directly inside `dir`, sorted.
pub async fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Eq2SvgError> {
    discover_documents(dir, "pdf").await
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_is_sibling_named_after_stem() {
        assert_eq!(
            default_output_dir(Path::new("papers/thesis.tex")),
            PathBuf::from("papers/thesis")
        );
        assert_eq!(default_output_dir(Path::new("notes.tex")), PathBuf::from("notes"));
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_extension(Path::new("a.TEX"), "tex"));
        assert!(has_extension(Path::new("dir/0.pdf"), "pdf"));
        assert!(!has_extension(Path::new("a.tex.bak"), "tex"));
        assert!(!has_extension(Path::new("Makefile"), "tex"));
    }

    #[tokio::test]
    async fn read_missing_document() {
        let err = read_document(Path::new("/definitely/not/here.tex"))
            .await
            .unwrap_err();
        assert!(matches!(err, Eq2SvgError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn read_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.tex");
        std::fs::write(&path, b"caf\xe9 \\begin{equation}x\\end{equation}").unwrap();
        let text = read_document(&path).await.unwrap();
        assert!(text.contains("\\begin{equation}x\\end{equation}"));
    }

    #[tokio::test]
    async fn ensure_dir_reports_creation_once() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("paper");
        assert!(ensure_output_dir(&out).await.unwrap());
        assert!(!ensure_output_dir(&out).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_dir_fails_under_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blocker");
        std::fs::write(&file, "x").unwrap();
        let err = ensure_output_dir(&file.join("paper")).await.unwrap_err();
        assert!(matches!(err, Eq2SvgError::OutputDirFailed { .. }));
    }

    #[tokio::test]
    async fn discovery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.tex", "a.tex", "notes.txt", "c.pdf"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.tex")).unwrap();

        let docs = discover_documents(dir.path(), "tex").await.unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tex", "b.tex"]);

        let pdfs = list_pdfs(dir.path()).await.unwrap();
        assert_eq!(pdfs, vec![dir.path().join("c.pdf")]);
    }
}
