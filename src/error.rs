// src/error.rs
//
// Unified error handling for mutable-image
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - UserError: Invalid edit arguments, recoverable
// - CodecError: Format/encoding issues
// - ResourceLimit: Dimension/pixel limits
// - InternalBug: Library bugs (should not happen)
//
// A codec that cannot handle a buffer at all is NOT an error: the handle
// degrades to its undecodable state instead (see handle.rs).

use crate::geometry::Rectangle;
use std::borrow::Cow;
use thiserror::Error;

/// Error taxonomy shared by every codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Invalid edit arguments, recoverable by the caller
    UserError,
    /// Format/encoding issues
    CodecError,
    /// Dimension/pixel limits
    ResourceLimit,
    /// Library bugs (should not happen)
    InternalBug,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::UserError => "UserError",
            ErrorCategory::CodecError => "CodecError",
            ErrorCategory::ResourceLimit => "ResourceLimit",
            ErrorCategory::InternalBug => "InternalBug",
        }
    }
}

/// mutable-image error types
#[derive(Debug, Clone, Error)]
pub enum MutableImageError {
    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    #[error("Corrupted image data")]
    CorruptedImage,

    // Size Limit Errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Edit Errors
    #[error("Crop region {region} exceeds image dimensions ({img_width}x{img_height})")]
    InvalidCropBounds {
        region: Rectangle,
        img_width: u32,
        img_height: u32,
    },

    #[error("Invalid crop dimensions: width={width}, height={height}")]
    InvalidCropDimensions { width: u32, height: u32 },

    #[error("Invalid scale factor: {factor}. Expected a finite value greater than 0")]
    InvalidScaleFactor { factor: f64 },

    #[error("Resize failed ({source_width}x{source_height} -> {target_width}x{target_height}): {message}")]
    ResizeFailed {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        message: Cow<'static, str>,
    },

    // Encode Errors
    #[error("Failed to encode as {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

// Constructor Helpers
impl MutableImageError {
    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn corrupted_image() -> Self {
        Self::CorruptedImage
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn invalid_crop_bounds(region: Rectangle, img_width: u32, img_height: u32) -> Self {
        Self::InvalidCropBounds {
            region,
            img_width,
            img_height,
        }
    }

    pub fn invalid_crop_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidCropDimensions { width, height }
    }

    pub fn invalid_scale_factor(factor: f64) -> Self {
        Self::InvalidScaleFactor { factor }
    }

    pub fn resize_failed(
        source_dims: (u32, u32),
        target_dims: (u32, u32),
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ResizeFailed {
            source_width: source_dims.0,
            source_height: source_dims.1,
            target_width: target_dims.0,
            target_height: target_dims.1,
            message: message.into(),
        }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (caller can fix it)
    ///
    /// Consistent with category():
    /// - UserError and ResourceLimit errors are recoverable
    /// - CodecError and InternalBug errors are not
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::ResourceLimit => true,
            ErrorCategory::CodecError | ErrorCategory::InternalBug => false,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCropBounds { .. }
            | Self::InvalidCropDimensions { .. }
            | Self::InvalidScaleFactor { .. } => ErrorCategory::UserError,

            // ResizeFailed is a processing failure inside the codec, so it is
            // grouped with decode/encode failures.
            Self::UnsupportedFormat { .. }
            | Self::DecodeFailed { .. }
            | Self::CorruptedImage
            | Self::EncodeFailed { .. }
            | Self::ResizeFailed { .. } => ErrorCategory::CodecError,

            Self::DimensionExceedsLimit { .. } | Self::PixelCountExceedsLimit { .. } => {
                ErrorCategory::ResourceLimit
            }

            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, MutableImageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_region() {
        let err = MutableImageError::invalid_crop_bounds(Rectangle::new(5, 6, 10, 10), 8, 8);
        let msg = err.to_string();
        assert!(msg.contains("10x10+5+6"), "{msg}");
        assert!(msg.contains("8x8"));
    }

    #[test]
    fn test_error_recoverable() {
        assert!(MutableImageError::invalid_scale_factor(0.0).is_recoverable());
        assert!(MutableImageError::invalid_crop_dimensions(0, 100).is_recoverable());
        assert!(MutableImageError::dimension_exceeds_limit(40000, 32768).is_recoverable());
        assert!(!MutableImageError::decode_failed("test").is_recoverable());
        assert!(!MutableImageError::internal_panic("test").is_recoverable());
    }

    #[test]
    fn test_error_category_codec_error() {
        for err in [
            MutableImageError::unsupported_format("gif"),
            MutableImageError::decode_failed("test"),
            MutableImageError::corrupted_image(),
            MutableImageError::encode_failed("jpeg", "test"),
            MutableImageError::resize_failed((100, 100), (50, 50), "test"),
        ] {
            assert_eq!(err.category(), ErrorCategory::CodecError, "{err}");
        }
    }

    #[test]
    fn test_error_category_user_and_limits() {
        assert_eq!(
            MutableImageError::invalid_crop_bounds(Rectangle::default(), 1, 1).category(),
            ErrorCategory::UserError
        );
        assert_eq!(
            MutableImageError::pixel_count_exceeds_limit(1_000_000_000, 100_000_000).category(),
            ErrorCategory::ResourceLimit
        );
        assert_eq!(
            MutableImageError::internal_panic("boom").category(),
            ErrorCategory::InternalBug
        );
    }

    #[test]
    fn test_error_category_as_str() {
        assert_eq!(ErrorCategory::UserError.as_str(), "UserError");
        assert_eq!(ErrorCategory::CodecError.as_str(), "CodecError");
        assert_eq!(ErrorCategory::ResourceLimit.as_str(), "ResourceLimit");
        assert_eq!(ErrorCategory::InternalBug.as_str(), "InternalBug");
    }
}
