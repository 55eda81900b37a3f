//! Error types for the pdf2img library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal for one document**: the document cannot be
//!   converted at all (missing input, corrupt PDF, engine unavailable).
//!   Returned as `Err(ConvertError)` from the top-level `convert*` functions.
//!   In batch mode the orchestrator logs it and moves on to the next file.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to encode or write.
//!   Depending on [`crate::config::PageFailurePolicy`] it either aborts the
//!   remaining pages of that document or is logged and skipped while the
//!   rest of the document continues.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! page failure, log and continue, or collect all errors for a post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2img library.
///
/// Page-level failures use [`PageError`] and are handled according to the
/// configured failure policy rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium-render returned an error for a specific page.
    ///
    /// Rasterisation is atomic per document: one unrenderable page fails the
    /// whole document, there is no partial-page success at this stage.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Page errors (abort policy) ────────────────────────────────────────
    /// A page failed under [`crate::config::PageFailurePolicy::Abort`].
    #[error("Document aborted: {0}")]
    PageFailed(#[from] PageError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium (https://github.com/bblanchon/pdfium-binaries) and either\n\
place it next to the executable or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Recorded in [`crate::stats::ConversionStats`] when a page is skipped
/// under [`crate::config::PageFailurePolicy::SkipAndLog`]; wrapped into
/// [`ConvertError::PageFailed`] under the abort policy.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    /// Image encoding failed for a page.
    #[error("Page {page}: image encoding failed: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The encoded page could not be written to disk.
    #[error("Page {page}: failed to write '{path}': {detail}")]
    WriteFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },
}

impl PageError {
    /// 1-based index of the page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::EncodeFailed { page, .. } => *page,
            PageError::WriteFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_not_found_display() {
        let e = ConvertError::InputNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn rasterisation_failed_display() {
        let e = ConvertError::RasterisationFailed {
            page: 3,
            detail: "bad content stream".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("bad content stream"));
    }

    #[test]
    fn page_error_carries_index() {
        let e = PageError::WriteFailed {
            page: 7,
            path: PathBuf::from("out/doc_page_007.png"),
            detail: "disk full".into(),
        };
        assert_eq!(e.page(), 7);
        assert!(e.to_string().contains("doc_page_007.png"));
    }

    #[test]
    fn page_error_converts_to_fatal() {
        let e: ConvertError = PageError::EncodeFailed {
            page: 1,
            detail: "unsupported colour type".into(),
        }
        .into();
        assert!(e.to_string().contains("aborted"));
    }
}
