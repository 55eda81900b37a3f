//! Image encoding: `DynamicImage` → image file on disk, per output format.
//!
//! Format rules:
//!
//! * **JPEG** has no alpha channel, so a page rendered with transparency is
//!   flattened to opaque RGB before encoding. This is a mandatory, silent
//!   conversion, never a failure — the alternative (erroring on every
//!   pdfium RGBA bitmap) would make JPEG output unusable.
//! * **PNG / TIFF / BMP** are written as-is, preserving the source colour
//!   mode including alpha.
//!
//! Encoding is deterministic for a fixed bitmap/format/quality, so
//! re-running the same conversion overwrites files with identical bytes.

use crate::config::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Encode one rendered page and write it to `path`.
///
/// `quality` applies to JPEG only (1–100, clamped by the config builder).
pub fn write_page(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<(), image::ImageError> {
    match format {
        OutputFormat::Jpeg => {
            let flattened;
            let source = if image.color().has_alpha() {
                debug!("Flattening alpha channel for JPEG output");
                flattened = DynamicImage::ImageRgb8(image.to_rgb8());
                &flattened
            } else {
                image
            };

            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            source.write_with_encoder(encoder)?;
        }
        OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Bmp => {
            image.save_with_format(path, format.image_format())?;
        }
    }

    debug!("Wrote {} ({format})", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn translucent_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([200, 30, 30, 128])))
    }

    #[test]
    fn jpeg_flattens_alpha_to_opaque_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.jpg");
        write_page(&translucent_image(), &path, OutputFormat::Jpeg, 80).unwrap();

        let decoded = image::open(&path).unwrap();
        assert!(
            !decoded.color().has_alpha(),
            "JPEG output must not carry alpha, got {:?}",
            decoded.color()
        );
    }

    #[test]
    fn png_preserves_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        write_page(&translucent_image(), &path, OutputFormat::Png, 95).unwrap();

        let decoded = image::open(&path).unwrap();
        assert!(decoded.color().has_alpha());
        // PNG round-trips pixel data exactly.
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([200, 30, 30, 128]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let img = translucent_image();

        for format in [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Bmp] {
            let a = dir.path().join(format!("a.{}", format.extension()));
            let b = dir.path().join(format!("b.{}", format.extension()));
            write_page(&img, &a, format, 80).unwrap();
            write_page(&img, &b, format, 80).unwrap();
            assert_eq!(
                std::fs::read(&a).unwrap(),
                std::fs::read(&b).unwrap(),
                "{format} encoding should be byte-identical across runs"
            );
        }
    }

    #[test]
    fn quality_changes_jpeg_output() {
        let dir = tempfile::tempdir().unwrap();
        // A noisy gradient so quality actually matters.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 3) as u8, 255])
        }));
        let hi = dir.path().join("hi.jpg");
        let lo = dir.path().join("lo.jpg");
        write_page(&img, &hi, OutputFormat::Jpeg, 95).unwrap();
        write_page(&img, &lo, OutputFormat::Jpeg, 20).unwrap();
        assert!(
            std::fs::metadata(&hi).unwrap().len() > std::fs::metadata(&lo).unwrap().len(),
            "higher quality should produce a larger file"
        );
    }

    #[test]
    fn tiff_and_bmp_write_successfully() {
        let dir = tempfile::tempdir().unwrap();
        for format in [OutputFormat::Tiff, OutputFormat::Bmp] {
            let path = dir.path().join(format!("page.{}", format.extension()));
            write_page(&translucent_image(), &path, format, 95).unwrap();
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}
