// src/engine/transform.rs
//
// In-place pixel edits: scale (fast_image_resize) and crop.

use crate::engine::config::CodecConfig;
use crate::error::{MutableImageError, Result};
use crate::geometry::Rectangle;
use fast_image_resize::{self as fir, ImageBufferError, MulDiv, PixelType, ResizeOptions};
use image::{imageops::FilterType, DynamicImage, RgbImage, RgbaImage};

/// Target dimensions for a scale edit. Rounds up so a 2x screenshot of an odd
/// width never loses its last column; never returns 0.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32)> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(MutableImageError::invalid_scale_factor(factor));
    }
    let scale = |v: u32| -> u32 {
        let scaled = (v as f64 * factor).ceil();
        if scaled >= u32::MAX as f64 {
            u32::MAX
        } else {
            (scaled as u32).max(1)
        }
    };
    Ok((scale(width), scale(height)))
}

/// Scale `img` by `factor`, checking the result against `config` limits.
pub fn scale_image(img: &DynamicImage, factor: f64, config: &CodecConfig) -> Result<DynamicImage> {
    let (src_w, src_h) = (img.width(), img.height());
    let (dst_w, dst_h) = scaled_dimensions(src_w, src_h, factor)?;
    config.check_dimensions(dst_w, dst_h)?;

    if (dst_w, dst_h) == (src_w, src_h) {
        return Ok(img.clone());
    }
    fast_resize(img, dst_w, dst_h)
        .map_err(|reason| MutableImageError::resize_failed((src_w, src_h), (dst_w, dst_h), reason))
}

/// Cut `region` out of `img`. The region must be non-empty and lie entirely
/// inside the image.
pub fn crop_image(img: &DynamicImage, region: Rectangle) -> Result<DynamicImage> {
    if region.is_empty() {
        return Err(MutableImageError::invalid_crop_dimensions(
            region.width,
            region.height,
        ));
    }
    let (img_w, img_h) = (img.width(), img.height());
    if region.left < 0
        || region.top < 0
        || region.right() > img_w as i64
        || region.bottom() > img_h as i64
    {
        return Err(MutableImageError::invalid_crop_bounds(region, img_w, img_h));
    }
    Ok(img.crop_imm(
        region.left as u32,
        region.top as u32,
        region.width,
        region.height,
    ))
}

fn default_resize_options() -> ResizeOptions {
    ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
}

/// Resize with fast_image_resize, falling back to the image crate when the
/// SIMD path rejects the buffer.
pub fn fast_resize(
    img: &DynamicImage,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<DynamicImage, String> {
    let (src_width, src_height) = (img.width(), img.height());
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Err("invalid dimensions for resize".to_string());
    }

    // Keep RGB as RGB; everything else goes through RGBA.
    let (pixel_type, mut src_pixels): (PixelType, Vec<u8>) = match img {
        DynamicImage::ImageRgb8(rgb) => (PixelType::U8x3, rgb.as_raw().clone()),
        other => (PixelType::U8x4, other.to_rgba8().into_raw()),
    };

    let primary = match fir::images::Image::from_slice_u8(
        src_width,
        src_height,
        src_pixels.as_mut_slice(),
        pixel_type,
    ) {
        Ok(src_image) => resize_with_source_image(src_image, pixel_type, dst_width, dst_height),
        Err(ImageBufferError::InvalidBufferAlignment) => {
            let mut aligned = fir::images::Image::new(src_width, src_height, pixel_type);
            aligned.buffer_mut().copy_from_slice(&src_pixels);
            resize_with_source_image(aligned, pixel_type, dst_width, dst_height)
        }
        Err(other) => Err(format!("fir source image error: {other:?}")),
    };

    primary.or_else(|err| {
        resize_with_image_crate(
            &src_pixels,
            src_width,
            src_height,
            pixel_type,
            dst_width,
            dst_height,
        )
        .map_err(|fallback| format!("{err}; image crate fallback failed: {fallback}"))
    })
}

fn resize_with_source_image(
    mut src_image: fir::images::Image<'_>,
    pixel_type: PixelType,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<DynamicImage, String> {
    let mut dst_image = fir::images::Image::new(dst_width, dst_height, pixel_type);
    let premultiply = pixel_type == PixelType::U8x4;

    let mul_div = MulDiv::default();
    if premultiply {
        mul_div
            .multiply_alpha_inplace(&mut src_image)
            .map_err(|e| format!("failed to premultiply alpha: {e}"))?;
    }

    fir::Resizer::new()
        .resize(&src_image, &mut dst_image, &default_resize_options())
        .map_err(|e| format!("fir resize error: {e:?}"))?;

    if premultiply {
        mul_div
            .divide_alpha_inplace(&mut dst_image)
            .map_err(|e| format!("failed to unpremultiply alpha: {e}"))?;
    }

    from_raw(pixel_type, dst_width, dst_height, dst_image.into_vec())
}

fn resize_with_image_crate(
    src_pixels: &[u8],
    src_width: u32,
    src_height: u32,
    pixel_type: PixelType,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<DynamicImage, String> {
    let src = from_raw(pixel_type, src_width, src_height, src_pixels.to_vec())?;
    Ok(src.resize_exact(dst_width, dst_height, FilterType::Lanczos3))
}

fn from_raw(
    pixel_type: PixelType,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> std::result::Result<DynamicImage, String> {
    match pixel_type {
        PixelType::U8x3 => RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| "failed to build rgb image from resized data".to_string()),
        PixelType::U8x4 => RgbaImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| "failed to build rgba image from resized data".to_string()),
        _ => Err("unsupported pixel type after resize".to_string()),
    }
}
