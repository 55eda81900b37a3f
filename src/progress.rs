//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the orchestrator rasterises and writes each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a progress bar, a GUI status label, or a log sink
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because the conversion run
//! executes off the caller's interactive thread.

use std::sync::Arc;

/// Called by the conversion orchestrator as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in index order, so
/// events for one document arrive in order; a batch run emits one document's
/// events completely before starting the next.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once per document, after rasterisation, before the first write.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be written
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page has been encoded and written to disk.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `bytes`       — on-disk size of the written file
    fn on_page_done(&self, page_num: usize, total_pages: usize, bytes: u64) {
        let _ = (page_num, total_pages, bytes);
    }

    /// Called when a page failed to encode or write.
    ///
    /// Under [`crate::config::PageFailurePolicy::Abort`] this is the last
    /// event for the document.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the document's pages have all been attempted.
    ///
    /// # Arguments
    /// * `written`     — pages written without error
    /// * `total_pages` — pages attempted
    fn on_document_complete(&self, written: usize, total_pages: usize) {
        let _ = (written, total_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
