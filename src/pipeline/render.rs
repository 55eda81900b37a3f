//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Atomicity
//!
//! One engine invocation renders the whole selected page range. From the
//! orchestrator's view the call either yields every page or fails — there is
//! no partial-page success, so a caller never has to reason about a
//! half-rendered document.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rasterised page, owned by the orchestration step that produced it
/// and dropped as soon as it has been encoded.
pub struct RenderedPage {
    /// 1-based index within the selected range.
    pub index: usize,
    /// The bitmap, usually RGBA8 as produced by pdfium.
    pub image: DynamicImage,
}

/// Rasterise the selected pages of a PDF into images.
///
/// This runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// Pages come back in ascending index order.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<Vec<RenderedPage>, ConvertError> {
    let path = pdf_path.to_path_buf();
    let dpi = config.dpi;
    let password = config.password.clone();
    let pages = config.pages;
    let library_path = config.pdfium_library_path.clone();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, dpi, password.as_deref(), pages, library_path.as_deref())
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind a pdfium instance, honouring an explicit library path when given.
///
/// The path is threaded in from [`ConversionConfig`] instead of read from a
/// process-wide global, so two configs can target different engine builds.
fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ConvertError> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Map a pdfium load error to the matching [`ConvertError`].
fn map_load_error(e: PdfiumError, path: &Path, password: Option<&str>) -> ConvertError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ConvertError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        ConvertError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    password: Option<&str>,
    pages: Option<crate::config::PageRange>,
    library_path: Option<&Path>,
) -> Result<Vec<RenderedPage>, ConvertError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_load_error(e, pdf_path, password))?;

    let doc_pages = document.pages();
    let total_pages = doc_pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let indices: Vec<usize> = match pages {
        Some(range) => {
            let indices = range.to_indices(total_pages);
            if indices.is_empty() {
                return Err(ConvertError::PageOutOfRange {
                    page: range.first,
                    total: total_pages,
                });
            }
            indices
        }
        None => (0..total_pages).collect(),
    };

    // 72 points per inch is the PDF unit; the scale factor turns the page's
    // point dimensions into the requested pixel density.
    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    let mut results = Vec::with_capacity(indices.len());

    for (position, &idx) in indices.iter().enumerate() {
        let page = doc_pages
            .get(idx as u16)
            .map_err(|e| ConvertError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ConvertError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(RenderedPage {
            index: position + 1,
            image,
        });
    }

    Ok(results)
}

/// Document facts readable without rendering any page.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub pdf_version: String,
}

/// Open a PDF and report its page count and metadata without rasterising.
pub async fn inspect_document(
    pdf_path: &Path,
    password: Option<&str>,
    library_path: Option<&Path>,
) -> Result<DocumentInfo, ConvertError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());
    let lib = library_path.map(|p| p.to_path_buf());

    tokio::task::spawn_blocking(move || inspect_blocking(&path, pwd.as_deref(), lib.as_deref()))
        .await
        .map_err(|e| ConvertError::Internal(format!("Inspect task panicked: {}", e)))?
}

fn inspect_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    library_path: Option<&Path>,
) -> Result<DocumentInfo, ConvertError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_load_error(e, pdf_path, password))?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentInfo {
        path: pdf_path.to_path_buf(),
        page_count: document.pages().len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        pdf_version: format!("{:?}", document.version()),
    })
}
