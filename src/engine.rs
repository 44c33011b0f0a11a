// src/engine.rs
//
// The codec side of mutable-image:
// 1. The Codec trait a MutableImage drives
// 2. ImageCodec, the default implementation
// 3. The worker pool that keeps codec work off the caller's executor
//
// This file is a facade over the modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod codec;
mod common;
mod config;
mod decoder;
mod encoder;
mod image_codec;
mod pool;
mod transform;

pub use codec::{Codec, PixelBuffer};
pub use common::run_with_panic_policy;
pub use config::CodecConfig;
pub use decoder::{can_decode, decode_image, detect_format};
pub use encoder::{encode_image, encode_jpeg, encode_png, encode_webp, QualitySettings};
pub use image_codec::{DecodedImage, ImageCodec};
pub use pool::{defer, get_pool, THREADS_ENV};
pub use transform::{crop_image, fast_resize, scale_image, scaled_dimensions};
