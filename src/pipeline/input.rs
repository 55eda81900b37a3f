//! Input resolution: validate a user-supplied PDF path, enumerate batch
//! trees, and mirror directory structure into the output tree.
//!
//! ## Why validate magic bytes up front?
//!
//! pdfium error messages for a non-PDF file are cryptic. Checking the
//! `%PDF` magic before handing the path to the engine gives callers a
//! meaningful error instead of a generic load failure, and it happens once
//! per document rather than after rasterisation work has started.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A resolved input document: an existing, readable PDF plus its naming stem.
///
/// Ephemeral — recomputed per conversion, never persisted.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    stem: String,
}

impl Document {
    /// Validate the path and derive the stem.
    ///
    /// Checks, in order: existence, read permission, `%PDF` magic bytes.
    pub fn resolve(path: impl Into<PathBuf>) -> Result<Document, ConvertError> {
        let path = path.into();

        if !path.is_file() {
            return Err(ConvertError::InputNotFound { path });
        }

        match std::fs::File::open(&path) {
            Ok(mut f) => {
                use std::io::Read;
                let mut magic = [0u8; 4];
                // A file too short to hold the magic is not a PDF either.
                match f.read_exact(&mut magic) {
                    Ok(()) if &magic == b"%PDF" => {}
                    _ => return Err(ConvertError::NotAPdf { path, magic }),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(ConvertError::PermissionDenied { path });
            }
            Err(_) => {
                return Err(ConvertError::InputNotFound { path });
            }
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        debug!("Resolved input PDF: {}", path.display());
        Ok(Document { path, stem })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename without directory or extension; the seed for output names.
    pub fn stem(&self) -> &str {
        &self.stem
    }
}

/// Enumerate `*.pdf` files under `root`, top level only unless `recursive`.
///
/// The extension match is case-insensitive (`.PDF` counts). Results are
/// sorted by path so batch runs process documents in a stable order
/// regardless of filesystem iteration quirks.
pub fn enumerate_pdfs(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    if !root.is_dir() {
        return Err(ConvertError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut pdfs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| ConvertError::Internal(format!("walk failed: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            pdfs.push(entry.into_path());
        }
    }

    debug!("Found {} PDF file(s) under {}", pdfs.len(), root.display());
    Ok(pdfs)
}

/// Compute the output directory that mirrors `pdf_path`'s position under
/// `input_root` into `output_root`.
///
/// `in/sub/doc.pdf` with output root `out/` maps to `out/sub/`; a document
/// at the input root maps to `out/` itself. Pure path arithmetic — the
/// caller creates the directory.
pub fn mirror_output_dir(input_root: &Path, pdf_path: &Path, output_root: &Path) -> PathBuf {
    let relative_parent = pdf_path
        .strip_prefix(input_root)
        .ok()
        .and_then(|rel| rel.parent())
        .unwrap_or_else(|| Path::new(""));
    output_root.join(relative_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolve_rejects_missing_file() {
        let err = Document::resolve("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }));
    }

    #[test]
    fn resolve_rejects_non_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        touch(&path, b"GIF89a nope");
        let err = Document::resolve(&path).unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }));
    }

    #[test]
    fn resolve_rejects_files_shorter_than_the_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stub.pdf");
        touch(&path, b"%P");
        let err = Document::resolve(&path).unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }));

        let empty = dir.path().join("empty.pdf");
        touch(&empty, b"");
        let err = Document::resolve(&empty).unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }));
    }

    #[test]
    fn resolve_derives_the_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jaarverslag 2023.pdf");
        touch(&path, b"%PDF-1.7\n");
        let doc = Document::resolve(&path).unwrap();
        assert_eq!(doc.stem(), "jaarverslag 2023");
        assert_eq!(doc.path(), path);
    }

    #[test]
    fn enumerate_respects_recursive_flag() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"), b"%PDF-1.4\n");
        touch(&dir.path().join("notes.txt"), b"hello");
        touch(&dir.path().join("sub/b.pdf"), b"%PDF-1.4\n");
        touch(&dir.path().join("sub/deep/c.PDF"), b"%PDF-1.4\n");

        let top = enumerate_pdfs(dir.path(), false).unwrap();
        assert_eq!(top, vec![dir.path().join("a.pdf")]);

        let all = enumerate_pdfs(dir.path(), true).unwrap();
        assert_eq!(
            all,
            vec![
                dir.path().join("a.pdf"),
                dir.path().join("sub/b.pdf"),
                dir.path().join("sub/deep/c.PDF"),
            ]
        );
    }

    #[test]
    fn enumerate_empty_directory_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enumerate_pdfs(dir.path(), true).unwrap().is_empty());
    }

    #[test]
    fn enumerate_missing_directory_is_an_error() {
        let err = enumerate_pdfs(Path::new("/no/such/dir"), false).unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }));
    }

    #[test]
    fn mirror_preserves_relative_structure() {
        let input = Path::new("/in");
        let output = Path::new("/out");
        assert_eq!(
            mirror_output_dir(input, Path::new("/in/doc.pdf"), output),
            PathBuf::from("/out")
        );
        assert_eq!(
            mirror_output_dir(input, Path::new("/in/sub/doc.pdf"), output),
            PathBuf::from("/out/sub")
        );
        assert_eq!(
            mirror_output_dir(input, Path::new("/in/a/b/doc.pdf"), output),
            PathBuf::from("/out/a/b")
        );
    }
}
