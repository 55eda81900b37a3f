//! # pdf2img
//!
//! Convert PDF documents into raster image files — one PDF at a time or a
//! whole directory tree in batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve the file (or enumerate *.pdf under a tree)
//!  ├─ 2. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Name     deterministic filenames, single-page collapse rule
//!  ├─ 4. Encode   PNG / JPEG / TIFF / BMP with format-specific fix-ups
//!  └─ 5. Record   per-run statistics (pages, bytes, elapsed, file list)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert_document, ConversionConfig, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .dpi(300)
//!         .format(OutputFormat::Png)
//!         .build()?;
//!     let stats = convert_document("report.pdf", "out/", &config).await?;
//!     println!("{} pages, {} bytes", stats.pages_converted, stats.total_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Naming
//!
//! A single-page `report.pdf` becomes `report.png`; a multi-page `doc.pdf`
//! becomes `doc_page_001.png`, `doc_page_002.png`, … — zero-padded so a
//! lexicographic sort of the output directory equals page order.
//!
//! ## Settings
//!
//! [`SettingsStore`] is a layered JSON configuration (`~/.pdf2img/`): a
//! complete default schema deep-merged with whatever the user persisted, so
//! an old or partial settings file never breaks a newer release.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2img = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod settings;
pub mod stats;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CancelFlag, ConversionConfig, ConversionConfigBuilder, OutputFormat, PageFailurePolicy,
    PageRange,
};
pub use convert::{
    convert_batch, convert_batch_sync, convert_document, convert_document_sync, inspect,
};
pub use error::{ConvertError, PageError};
pub use pipeline::render::DocumentInfo;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use settings::SettingsStore;
pub use stats::{BatchStats, ConversionReport, ConversionStats, RunState};
