// src/engine/encoder.rs
//
// Encoder operations: PNG (image crate), JPEG (mozjpeg), WebP (libwebp)

use crate::engine::common::run_with_panic_policy;
use crate::error::{MutableImageError, Result};
use crate::ops::OutputFormat;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use mozjpeg::{ColorSpace, Compress, ScanMode};
use std::borrow::Cow;
use std::io::Cursor;

/// Quality bands shared by the lossy encoders.
/// - High (>=85): visual quality first
/// - Balanced (70-84)
/// - Fast (<70): speed first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QualityBand {
    High,
    Balanced,
    Fast,
}

#[derive(Debug, Clone, Copy)]
pub struct QualitySettings {
    quality: u8,
}

impl QualitySettings {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.min(100),
        }
    }

    fn band(&self) -> QualityBand {
        match self.quality {
            85.. => QualityBand::High,
            70..=84 => QualityBand::Balanced,
            _ => QualityBand::Fast,
        }
    }

    pub fn jpeg_smoothing(&self) -> u8 {
        match self.quality {
            90.. => 0,
            70..=89 => 5,
            60..=69 => 10,
            _ => 18,
        }
    }

    pub fn webp_sns_strength(&self) -> i32 {
        match self.band() {
            QualityBand::High => 50,
            QualityBand::Balanced => 70,
            QualityBand::Fast => 80,
        }
    }

    pub fn webp_filter_strength(&self) -> i32 {
        match self.quality {
            80.. => 20,
            60..=79 => 30,
            _ => 40,
        }
    }

    pub fn webp_filter_sharpness(&self) -> i32 {
        match self.band() {
            QualityBand::High => 2,
            QualityBand::Balanced | QualityBand::Fast => 0,
        }
    }
}

/// Pick the output format: explicit choice first, else the source format,
/// else PNG (lossless, which is what screenshot comparisons want).
pub fn resolve_output(
    requested: Option<OutputFormat>,
    source: Option<ImageFormat>,
) -> OutputFormat {
    requested.unwrap_or(match source {
        Some(ImageFormat::Jpeg) => OutputFormat::Jpeg {
            quality: OutputFormat::DEFAULT_QUALITY,
        },
        Some(ImageFormat::WebP) => OutputFormat::WebP {
            quality: OutputFormat::DEFAULT_QUALITY,
        },
        _ => OutputFormat::Png,
    })
}

pub fn encode_image(img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    if img.width() == 0 || img.height() == 0 {
        return Err(MutableImageError::encode_failed(
            format.as_str(),
            "image has zero width or height",
        ));
    }
    match format {
        OutputFormat::Png => encode_png(img),
        OutputFormat::Jpeg { quality } => encode_jpeg(img, quality),
        OutputFormat::WebP { quality } => encode_webp(img, quality),
    }
}

/// Encode to PNG using the image crate
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:png", || {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| {
                MutableImageError::encode_failed("png", format!("PNG encode failed: {e}"))
            })?;
        Ok(buf)
    })
}

fn as_rgb8(img: &DynamicImage) -> Cow<'_, RgbImage> {
    match img {
        DynamicImage::ImageRgb8(rgb) => Cow::Borrowed(rgb),
        _ => Cow::Owned(img.to_rgb8()),
    }
}

fn as_rgba8(img: &DynamicImage) -> Cow<'_, RgbaImage> {
    match img {
        DynamicImage::ImageRgba8(rgba) => Cow::Borrowed(rgba),
        _ => Cow::Owned(img.to_rgba8()),
    }
}

/// Encode to JPEG using mozjpeg with web-oriented settings
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:jpeg", || {
        let settings = QualitySettings::new(quality);
        let rgb = as_rgb8(img);
        let (w, h) = rgb.dimensions();
        let pixels: &[u8] = rgb.as_raw();

        if pixels.len() != (w as usize) * (h as usize) * 3 {
            return Err(MutableImageError::corrupted_image());
        }

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(w as usize, h as usize);
        comp.set_color_space(ColorSpace::JCS_YCbCr);
        comp.set_quality(settings.quality as f32);
        comp.set_chroma_sampling_pixel_sizes((2, 2), (2, 2));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);
        comp.set_optimize_scans(true);
        comp.set_scan_optimization_mode(ScanMode::AllComponentsTogether);
        comp.set_smoothing_factor(settings.jpeg_smoothing());

        let mut output = Vec::with_capacity((w as usize * h as usize * 3 / 10).max(4096));
        let mut writer = comp.start_compress(&mut output).map_err(|e| {
            MutableImageError::encode_failed(
                "jpeg",
                format!("mozjpeg: failed to start compress: {e:?}"),
            )
        })?;
        for row in pixels.chunks(w as usize * 3) {
            writer.write_scanlines(row).map_err(|e| {
                MutableImageError::encode_failed(
                    "jpeg",
                    format!("mozjpeg: failed to write scanlines: {e:?}"),
                )
            })?;
        }
        writer.finish().map_err(|e| {
            MutableImageError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
        })?;

        Ok(output)
    })
}

/// Encode to WebP. Alpha is kept when the image has it.
pub fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:webp", || {
        let settings = QualitySettings::new(quality);
        let (w, h) = (img.width(), img.height());
        let rgba;
        let rgb;
        let encoder = if img.color().has_alpha() {
            rgba = as_rgba8(img);
            webp::Encoder::from_rgba(&rgba, w, h)
        } else {
            rgb = as_rgb8(img);
            webp::Encoder::from_rgb(&rgb, w, h)
        };

        let mut config = webp::WebPConfig::new()
            .map_err(|_| MutableImageError::internal_panic("failed to create WebPConfig"))?;
        config.quality = settings.quality as f32;
        config.method = 4;
        config.pass = 1;
        config.preprocessing = 0;
        config.sns_strength = settings.webp_sns_strength();
        config.autofilter = 1;
        config.filter_strength = settings.webp_filter_strength();
        config.filter_sharpness = settings.webp_filter_sharpness();

        let mem = encoder.encode_advanced(&config).map_err(|e| {
            MutableImageError::encode_failed("webp", format!("WebP encode failed: {e:?}"))
        })?;
        Ok(mem.to_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_resolve_output_prefers_explicit_choice() {
        assert_eq!(
            resolve_output(Some(OutputFormat::Png), Some(ImageFormat::Jpeg)),
            OutputFormat::Png
        );
    }

    #[test]
    fn test_resolve_output_keeps_source_format() {
        assert_eq!(
            resolve_output(None, Some(ImageFormat::Jpeg)),
            OutputFormat::Jpeg { quality: 80 }
        );
        assert_eq!(
            resolve_output(None, Some(ImageFormat::WebP)),
            OutputFormat::WebP { quality: 80 }
        );
        assert_eq!(resolve_output(None, Some(ImageFormat::Png)), OutputFormat::Png);
        assert_eq!(resolve_output(None, None), OutputFormat::Png);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let img = create_test_image(16, 9);
        let encoded = encode_image(&img, OutputFormat::Png).unwrap();
        assert_eq!(&encoded[1..4], b"PNG");
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_encode_jpeg_produces_valid_jpeg() {
        let img = create_test_image(100, 100);
        let result = encode_image(&img, OutputFormat::Jpeg { quality: 80 }).unwrap();
        assert_eq!(&result[0..2], &[0xFF, 0xD8]);
        assert_eq!(&result[result.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_webp_from_rgba() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 6, image::Rgba([1, 2, 3, 128])));
        let result = encode_image(&img, OutputFormat::WebP { quality: 90 }).unwrap();
        assert_eq!(&result[0..4], b"RIFF");
        assert_eq!(&result[8..12], b"WEBP");
        let decoded = image::load_from_memory(&result).unwrap();
        assert_eq!(decoded.dimensions(), (10, 6));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_webp_opaque_stays_rgb() {
        let img = create_test_image(8, 8);
        let result = encode_image(&img, OutputFormat::WebP { quality: 90 }).unwrap();
        let decoded = image::load_from_memory(&result).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_rejects_empty_image() {
        let img = DynamicImage::new_rgb8(0, 0);
        let err = encode_image(&img, OutputFormat::Png).unwrap_err();
        assert!(matches!(err, MutableImageError::EncodeFailed { .. }));
    }

    #[test]
    fn test_quality_bands() {
        assert_eq!(QualitySettings::new(95).webp_filter_sharpness(), 2);
        assert_eq!(QualitySettings::new(75).webp_sns_strength(), 70);
        assert_eq!(QualitySettings::new(10).jpeg_smoothing(), 18);
        assert_eq!(QualitySettings::new(200).jpeg_smoothing(), 0);
    }
}
