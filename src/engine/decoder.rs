// src/engine/decoder.rs
//
// Decoder routing: JPEG (mozjpeg), PNG (zune-png), WebP (libwebp), rest (image crate)

use crate::engine::common::run_with_panic_policy;
use crate::engine::config::CodecConfig;
use crate::error::{MutableImageError, Result};
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use mozjpeg::Decompress;
use webp::{BitstreamFeatures, Decoder as WebPDecoder};
use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Whether this build can decode `bytes` at all.
pub fn can_decode(bytes: &[u8]) -> bool {
    detect_format(bytes).is_some_and(|format| format.reading_enabled())
}

/// Decode `bytes`, routing by detected format, and return the detected format
/// alongside the pixels.
pub fn decode_image(
    bytes: &[u8],
    config: &CodecConfig,
) -> Result<(DynamicImage, Option<ImageFormat>)> {
    let detected = detect_format(bytes);
    let img = match detected {
        Some(ImageFormat::Jpeg) => decode_jpeg_mozjpeg(bytes, config)?,
        Some(ImageFormat::Png) => decode_png_zune(bytes, config)?,
        Some(ImageFormat::WebP) => decode_webp_libwebp(bytes, config)?,
        _ => decode_with_image_crate(bytes, config)?,
    };
    Ok((img, detected))
}

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo)
pub fn decode_jpeg_mozjpeg(data: &[u8], config: &CodecConfig) -> Result<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(MutableImageError::decode_failed(
                "mozjpeg: missing JPEG EOI marker",
            ));
        }

        let mut decompress = Decompress::new_mem(data)
            .map_err(|e| {
                MutableImageError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
            })?
            .rgb()
            .map_err(|e| {
                MutableImageError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
            })?;

        let width = u32::try_from(decompress.width())
            .map_err(|_| MutableImageError::decode_failed("mozjpeg: width out of range"))?;
        let height = u32::try_from(decompress.height())
            .map_err(|_| MutableImageError::decode_failed("mozjpeg: height out of range"))?;
        config.check_dimensions(width, height)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            MutableImageError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat: Vec<u8> = pixels.into_iter().flatten().collect();

        RgbImage::from_raw(width, height, flat)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| {
                MutableImageError::decode_failed("mozjpeg: failed to create image from raw data")
            })
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8-bit.
pub fn decode_png_zune(data: &[u8], config: &CodecConfig) -> Result<DynamicImage> {
    run_with_panic_policy("decode:png", || {
        let options = DecoderOptions::default().png_set_strip_to_8bit(true);
        let mut decoder = PngDecoder::new_with_options(ZCursor::new(data), options);

        // Header first so a huge canvas is rejected before allocating it.
        decoder
            .decode_headers()
            .map_err(|e| MutableImageError::decode_failed(format!("png: bad header: {e}")))?;
        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| MutableImageError::decode_failed("png: missing header info"))?;
        let (width, height) = (width as u32, height as u32);
        config.check_dimensions(width, height)?;

        let buf = match decoder
            .decode()
            .map_err(|e| MutableImageError::decode_failed(format!("png: decode failed: {e}")))?
        {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => {
                return Err(MutableImageError::decode_failed(
                    "png: unexpected non-U8 pixel buffer",
                ))
            }
        };

        let colorspace = decoder
            .colorspace()
            .ok_or_else(|| MutableImageError::decode_failed("png: missing colorspace"))?;

        let img = match colorspace {
            ColorSpace::RGB => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => {
                RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
            }
            ColorSpace::Luma => {
                GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
            }
            ColorSpace::LumaA => {
                GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
            }
            other => {
                return Err(MutableImageError::decode_failed(format!(
                    "png: unsupported colorspace {other:?}"
                )))
            }
        };
        img.ok_or_else(MutableImageError::corrupted_image)
    })
}

/// Decode WebP using libwebp. Animated WebP falls back to the image crate.
pub fn decode_webp_libwebp(data: &[u8], config: &CodecConfig) -> Result<DynamicImage> {
    run_with_panic_policy("decode:webp", || {
        let features = BitstreamFeatures::new(data).ok_or_else(|| {
            MutableImageError::decode_failed("webp: failed to read bitstream features")
        })?;
        config.check_dimensions(features.width(), features.height())?;

        if features.has_animation() {
            return image::load_from_memory(data).map_err(|e| {
                MutableImageError::decode_failed(format!("webp (animated) decode failed: {e}"))
            });
        }

        let decoded = WebPDecoder::new(data)
            .decode()
            .ok_or_else(|| MutableImageError::decode_failed("webp: decode failed"))?;
        config.check_dimensions(decoded.width(), decoded.height())?;

        Ok(decoded.to_image())
    })
}

/// Decode any other format the image crate was built with.
pub fn decode_with_image_crate(data: &[u8], config: &CodecConfig) -> Result<DynamicImage> {
    run_with_panic_policy("decode:image", || {
        let img = image::load_from_memory(data).map_err(|e| match e {
            image::ImageError::Unsupported(unsupported) => {
                MutableImageError::unsupported_format(unsupported.to_string())
            }
            other => MutableImageError::decode_failed(format!("decode failed: {other}")),
        })?;
        config.check_dimensions(img.width(), img.height())?;
        Ok(img)
    })
}
