//! Conversion orchestration: single-document and batch entry points.
//!
//! The orchestrator drives one document end-to-end — rasterise, name,
//! encode, record — and returns structured [`ConversionStats`] rather than
//! printing anything. Presentation (CLI summary lines, GUI labels) lives
//! entirely in the caller, wired in through the progress callback.
//!
//! ## Failure model
//!
//! * Rasterisation is atomic per document: all pages or an error.
//! * A per-page encode/write failure follows
//!   [`crate::config::PageFailurePolicy`]: abort the document (interactive
//!   default) or log, skip the page and continue (the batch path).
//! * In batch mode a document-level failure is logged and the run moves on
//!   to the next file; the batch result reports `successes/total`.

use crate::config::{ConversionConfig, PageFailurePolicy};
use crate::error::{ConvertError, PageError};
use crate::naming;
use crate::pipeline::{encode, input, render};
use crate::stats::{BatchStats, ConversionStats};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one PDF document into image files under `output_dir`.
///
/// The output directory is created if absent. Pages are written in
/// ascending index order; filenames follow the naming policy in
/// [`crate::naming`], seeded by `config.prefix` or the document's stem.
///
/// # Errors
/// Returns `Err(ConvertError)` when the input is missing or unreadable,
/// rasterisation fails, the output directory cannot be created, or — under
/// [`PageFailurePolicy::Abort`] — any single page fails to encode or write.
pub async fn convert_document(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    let output_dir = output_dir.as_ref();
    info!("Starting conversion: {}", input_path.as_ref().display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let document = input::Document::resolve(input_path.as_ref())?;

    // ── Step 2: Prepare output directory ─────────────────────────────────
    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::OutputDirFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    // ── Step 3: Rasterise (atomic: all pages or an error) ────────────────
    let render_start = Instant::now();
    let pages = render::render_pages(document.path(), config).await?;
    debug!(
        "Rendered {} pages in {}ms",
        pages.len(),
        render_start.elapsed().as_millis()
    );

    let total = pages.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(total);
    }

    // ── Step 4: Name, encode, write, record ──────────────────────────────
    let stem = config.prefix.as_deref().unwrap_or(document.stem());
    let mut stats = ConversionStats::new();
    stats.begin();

    for page in &pages {
        let filename = naming::page_filename(stem, page.index, total, config.format);
        let path = output_dir.join(&filename);

        let outcome = encode::write_page(&page.image, &path, config.format, config.quality)
            .map_err(|e| page_error_for(page.index, &path, e))
            .and_then(|()| {
                stats.record_page(&path).map_err(|e| PageError::WriteFailed {
                    page: page.index,
                    path: path.clone(),
                    detail: e.to_string(),
                })
            });

        match outcome {
            Ok(size) => {
                debug!("Page {}/{} → {} ({} bytes)", page.index, total, filename, size);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_done(page.index, total, size);
                }
            }
            Err(page_err) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page.index, total, &page_err.to_string());
                }
                match config.on_page_failure {
                    PageFailurePolicy::SkipAndLog => {
                        warn!("{page_err}; skipping page");
                        stats.record_failure();
                    }
                    PageFailurePolicy::Abort => {
                        stats.finish();
                        return Err(page_err.into());
                    }
                }
            }
        }
    }

    // ── Step 5: Finalise ─────────────────────────────────────────────────
    stats.finish();
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(stats.pages_converted, total);
    }
    info!(
        "Conversion complete: {}/{} pages, {} bytes, {}ms",
        stats.pages_converted,
        total,
        stats.total_bytes,
        stats.elapsed().as_millis()
    );

    Ok(stats)
}

/// Convert every `*.pdf` under `input_root` into a mirrored tree under
/// `output_root`.
///
/// Directory structure is preserved exactly: `in/sub/doc.pdf` produces
/// images under `out/sub/`. Individual document failures are logged and the
/// batch continues; the result reports `successes/total` and wall-clock
/// time. Finding zero PDFs is not an error — the result is `0/0`.
///
/// A cancellation request via [`crate::config::CancelFlag`] is honoured
/// only between documents, never mid-document.
pub async fn convert_batch(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
    recursive: bool,
) -> Result<BatchStats, ConvertError> {
    let input_root = input_root.as_ref();
    let output_root = output_root.as_ref();
    let batch_start = Instant::now();

    let pdf_files = input::enumerate_pdfs(input_root, recursive)?;
    info!("Found {} PDF file(s) under {}", pdf_files.len(), input_root.display());

    std::fs::create_dir_all(output_root).map_err(|e| ConvertError::OutputDirFailed {
        path: output_root.to_path_buf(),
        source: e,
    })?;

    // A per-batch config: each document names its files after its own stem,
    // so a caller-supplied prefix would collide across documents.
    let mut doc_config = config.clone();
    doc_config.prefix = None;

    let mut aggregate = ConversionStats::new();
    aggregate.begin();
    let mut succeeded = 0usize;

    for pdf_file in &pdf_files {
        if config.cancel.is_cancelled() {
            warn!("Batch cancelled; stopping before {}", pdf_file.display());
            break;
        }

        let file_output_dir = input::mirror_output_dir(input_root, pdf_file, output_root);

        match convert_document(pdf_file, &file_output_dir, &doc_config).await {
            Ok(stats) => {
                succeeded += 1;
                aggregate.pages_converted += stats.pages_converted;
                aggregate.pages_failed += stats.pages_failed;
                aggregate.total_bytes += stats.total_bytes;
                aggregate.files_created.extend(stats.files_created);
            }
            Err(e) => {
                warn!("Failed to convert {}: {e}", pdf_file.display());
            }
        }
    }

    aggregate.finish();
    let elapsed = batch_start.elapsed();
    info!(
        "Batch complete: {}/{} documents in {:.2}s",
        succeeded,
        pdf_files.len(),
        elapsed.as_secs_f64()
    );

    Ok(BatchStats {
        succeeded,
        total: pdf_files.len(),
        elapsed,
        pages: aggregate.report(),
    })
}

/// Open a PDF and report its page count and metadata without converting.
pub async fn inspect(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<render::DocumentInfo, ConvertError> {
    let document = input::Document::resolve(input_path.as_ref())?;
    render::inspect_document(
        document.path(),
        config.password.as_deref(),
        config.pdfium_library_path.as_deref(),
    )
    .await
}

/// Synchronous wrapper around [`convert_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_document_sync(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    runtime()?.block_on(convert_document(input_path, output_dir, config))
}

/// Synchronous wrapper around [`convert_batch`].
pub fn convert_batch_sync(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
    recursive: bool,
) -> Result<BatchStats, ConvertError> {
    runtime()?.block_on(convert_batch(input_root, output_root, config, recursive))
}

fn runtime() -> Result<tokio::runtime::Runtime, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))
}

/// Classify an encoder error: I/O problems are write failures, everything
/// else is an encoding failure.
fn page_error_for(page: usize, path: &Path, e: image::ImageError) -> PageError {
    match e {
        image::ImageError::IoError(io) => PageError::WriteFailed {
            page,
            path: path.to_path_buf(),
            detail: io.to_string(),
        },
        other => PageError::EncodeFailed {
            page,
            detail: other.to_string(),
        },
    }
}
