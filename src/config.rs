//! Configuration types for PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for a PDF-to-image conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2img::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .format(OutputFormat::Jpeg)
///     .quality(80)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–1200. Default: 300.
    ///
    /// 300 DPI is print quality and the sweet spot for archival conversion.
    /// Drop to 150 for screen-only output, raise to 600 for small-font scans.
    pub dpi: u32,

    /// Target image format. Default: [`OutputFormat::Png`].
    pub format: OutputFormat,

    /// JPEG quality, 1–100. Default: 95. Ignored for lossless formats.
    pub quality: u8,

    /// Page range to convert (1-indexed, inclusive). Default: all pages.
    pub pages: Option<PageRange>,

    /// Filename prefix for output images. Default: the document's stem.
    pub prefix: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// What to do when a single page fails to encode or write.
    /// Default: [`PageFailurePolicy::Abort`].
    ///
    /// Interactive callers want Abort (one failure surfaces immediately);
    /// the CLI batch path uses SkipAndLog so one bad page cannot sink a
    /// thousand-file run.
    pub on_page_failure: PageFailurePolicy,

    /// Explicit path to the pdfium shared library.
    ///
    /// When `None`, pdfium is located via the platform default search
    /// (executable directory, then system paths). Threading the path through
    /// here instead of mutating a process-wide search path keeps the adapter
    /// testable and lets two configs target different engine builds.
    pub pdfium_library_path: Option<PathBuf>,

    /// Optional per-page progress events for UIs and progress bars.
    pub progress_callback: Option<ProgressCallback>,

    /// Cooperative stop flag, honoured only between documents in batch mode.
    pub cancel: CancelFlag,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            format: OutputFormat::Png,
            quality: 95,
            pages: None,
            prefix: None,
            password: None,
            on_page_failure: PageFailurePolicy::Abort,
            pdfium_library_path: None,
            progress_callback: None,
            cancel: CancelFlag::new(),
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("format", &self.format)
            .field("quality", &self.quality)
            .field("pages", &self.pages)
            .field("prefix", &self.prefix)
            .field("on_page_failure", &self.on_page_failure)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 1200);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality.clamp(1, 100);
        self
    }

    pub fn pages(mut self, range: PageRange) -> Self {
        self.config.pages = Some(range);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn on_page_failure(mut self, policy: PageFailurePolicy) -> Self {
        self.config.on_page_failure = policy;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn cancel(mut self, flag: CancelFlag) -> Self {
        self.config.cancel = flag;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.quality == 0 || c.quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "Quality must be 1–100, got {}",
                c.quality
            )));
        }
        if let Some(ref range) = c.pages {
            if range.first == 0 || range.first > range.last {
                return Err(ConvertError::InvalidConfig(format!(
                    "Invalid page range {}-{}: pages are 1-indexed and first must be <= last",
                    range.first, range.last
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Target raster format for the written image files.
///
/// Validated once at configuration time so an unknown format string is
/// rejected before any rendering work begins, never per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless, keeps alpha. (default)
    #[default]
    Png,
    /// Lossy; pages with an alpha channel are flattened to opaque RGB.
    Jpeg,
    /// Lossless, keeps colour mode.
    Tiff,
    /// Uncompressed bitmap.
    Bmp,
}

impl OutputFormat {
    /// Lowercase filename extension, e.g. `"jpg"` for Jpeg.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
        }
    }

    /// Whether the format supports an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }

    /// The corresponding `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(OutputFormat::Png),
            "JPG" | "JPEG" => Ok(OutputFormat::Jpeg),
            "TIFF" | "TIF" => Ok(OutputFormat::Tiff),
            "BMP" => Ok(OutputFormat::Bmp),
            other => Err(ConvertError::InvalidConfig(format!(
                "Unsupported output format '{other}' (expected PNG, JPG, JPEG, TIFF or BMP)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Bmp => "BMP",
        };
        f.write_str(name)
    }
}

/// A contiguous, 1-indexed, inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Expand into 0-indexed page numbers, clipped to the document length.
    pub fn to_indices(self, total_pages: usize) -> Vec<usize> {
        let s = self.first.max(1) - 1;
        let e = self.last.min(total_pages);
        (s..e).collect()
    }
}

/// What the orchestrator does when a single page fails to encode or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFailurePolicy {
    /// Abort the remaining pages of the document and surface the error. (default)
    #[default]
    Abort,
    /// Log a warning, skip the page, and keep converting the document.
    SkipAndLog,
}

/// Cooperative cancellation flag, cheap to clone and share with a UI thread.
///
/// A set flag stops a batch run *between* documents; a document that has
/// started rasterising always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the current batch run to stop after the in-flight document.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_dpi_and_quality() {
        let config = ConversionConfig::builder()
            .dpi(10_000)
            .quality(0)
            .build()
            .unwrap();
        assert_eq!(config.dpi, 1200);
        assert_eq!(config.quality, 1);
    }

    #[test]
    fn build_rejects_inverted_page_range() {
        let err = ConversionConfig::builder()
            .pages(PageRange::new(5, 2))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("page range"));
    }

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Tiff".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
        assert!("webp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn jpeg_extension_is_jpg() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert!(!OutputFormat::Jpeg.supports_alpha());
        assert!(OutputFormat::Png.supports_alpha());
    }

    #[test]
    fn page_range_clips_to_document() {
        assert_eq!(PageRange::new(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageRange::new(1, 99).to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageRange::new(7, 9).to_indices(3), Vec::<usize>::new());
    }

    #[test]
    fn cancel_flag_shares_state_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
