// lib.rs
//
// mutable-image: lazily decoded image handles and region tiling for
// screenshot pipelines.
//
// Design goals:
// - Never decode until something needs pixels
// - Decode once, edit in place any number of times, encode once
// - Bytes the codec cannot handle pass through untouched
// - Non-blocking async API; codec work runs on a worker pool

pub mod engine;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod ops;

pub use engine::{Codec, CodecConfig, DecodedImage, ImageCodec, PixelBuffer};
pub use error::{ErrorCategory, MutableImageError, Result};
pub use geometry::{contains, intersect, tile, tile_iter, Point, Rectangle, Size, Tiles};
pub use handle::{HandleState, MutableImage, SerializedImage};
pub use ops::{Edit, OutputFormat};
