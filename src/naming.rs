//! Output naming policy: document stem + page index → image filename.
//!
//! The rule is deliberately tiny and pure so both the orchestrator and any
//! UI preview can compute the exact filename a page will get without touching
//! the filesystem:
//!
//! * single-page documents collapse to `"{stem}.{ext}"` — no page suffix;
//! * multi-page documents get `"{stem}_page_{index:03}.{ext}"`, zero-padded
//!   so a plain lexicographic sort of the output directory equals page order.
//!
//! Documents past 999 pages simply produce wider indices (`_page_1000`);
//! they lose the uniform width but never truncate or collide.

use crate::config::OutputFormat;

/// Compute the output filename for one rendered page.
///
/// `page_index` is 1-based; `total_pages` is the page count of the whole
/// document (after range selection), which decides whether the single-page
/// collapse rule applies.
pub fn page_filename(
    stem: &str,
    page_index: usize,
    total_pages: usize,
    format: OutputFormat,
) -> String {
    if total_pages == 1 {
        format!("{stem}.{}", format.extension())
    } else {
        format!("{stem}_page_{page_index:03}.{}", format.extension())
    }
}
