// src/engine/config.rs
//
// ImageCodec configuration: output format and decode limits.

use crate::engine::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::{MutableImageError, Result};
use crate::ops::OutputFormat;

#[derive(Clone, Debug, PartialEq)]
pub struct CodecConfig {
    /// Format used when re-encoding. `None` keeps the source format.
    pub output: Option<OutputFormat>,
    /// Largest accepted width or height, after decode and after scaling
    pub max_dimension: u32,
    /// Largest accepted width * height
    pub max_pixels: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            output: None,
            max_dimension: MAX_DIMENSION,
            max_pixels: MAX_PIXELS,
        }
    }
}

impl CodecConfig {
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_limits(mut self, max_dimension: u32, max_pixels: u64) -> Self {
        self.max_dimension = max_dimension;
        self.max_pixels = max_pixels;
        self
    }

    /// Reject dimensions beyond the configured limits (decompression bombs,
    /// runaway scale factors).
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if width > self.max_dimension || height > self.max_dimension {
            return Err(MutableImageError::dimension_exceeds_limit(
                width.max(height),
                self.max_dimension,
            ));
        }
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(MutableImageError::pixel_count_exceeds_limit(
                pixels,
                self.max_pixels,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = CodecConfig::default();
        assert_eq!(config.output, None);
        assert!(config.check_dimensions(MAX_DIMENSION, 1).is_ok());
        assert!(matches!(
            config.check_dimensions(MAX_DIMENSION + 1, 1),
            Err(MutableImageError::DimensionExceedsLimit { .. })
        ));
    }

    #[test]
    fn test_pixel_limit() {
        let config = CodecConfig::default().with_limits(1000, 10_000);
        assert!(config.check_dimensions(100, 100).is_ok());
        let err = config.check_dimensions(101, 100).unwrap_err();
        assert!(matches!(
            err,
            MutableImageError::PixelCountExceedsLimit { pixels: 10_100, max: 10_000 }
        ));
    }

    #[test]
    fn test_with_output() {
        let config = CodecConfig::default().with_output(OutputFormat::Jpeg { quality: 70 });
        assert_eq!(config.output, Some(OutputFormat::Jpeg { quality: 70 }));
    }
}
