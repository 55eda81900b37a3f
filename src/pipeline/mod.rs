//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (path)    (pdfium)   (PNG/JPEG/TIFF/BMP on disk)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path (or enumerate a batch
//!    tree) and derive the naming stem
//! 2. [`render`] — rasterise the selected pages; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`encode`] — encode each `DynamicImage` in the target format and
//!    write it to the output directory

pub mod encode;
pub mod input;
pub mod render;
