// src/ops.rs
//
// Edit descriptions and output formats.
// Plain data: cheap to build, store and replay against a handle.

use crate::geometry::Rectangle;

/// An in-place edit that can be replayed on a `MutableImage`.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Scale both dimensions by `factor` (e.g. 0.5 to undo a 2x device pixel ratio)
    Scale { factor: f64 },

    /// Keep only `region` of the current image
    Crop { region: Rectangle },
}

/// Output format used when a decoded image is re-encoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
    WebP { quality: u8 },
}

impl OutputFormat {
    pub const DEFAULT_QUALITY: u8 = 80;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpeg",
            Self::WebP { .. } => "webp",
        }
    }
}
