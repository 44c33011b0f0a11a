// src/engine/codec.rs
//
// The capability set a MutableImage needs from an image codec.

use crate::error::Result;
use crate::geometry::Rectangle;
use std::future::Future;

/// A decoded pixel buffer that knows its own size.
pub trait PixelBuffer {
    /// `(width, height)` in pixels
    fn dimensions(&self) -> (u32, u32);
}

/// Converts between encoded bytes and a decoded pixel buffer, and edits the
/// decoded buffer in place.
///
/// Every operation is a future: implementations are free to push the work to
/// another thread or process. Callers await each step before starting the
/// next.
pub trait Codec {
    type Pixels: PixelBuffer + Send;

    /// Whether this codec can work with `encoded` in the current environment.
    ///
    /// Returning `false` is not a failure: the image is passed through
    /// untouched and edits become no-ops.
    fn can_decode(&self, encoded: &[u8]) -> bool;

    fn decode(&self, encoded: &[u8]) -> impl Future<Output = Result<Self::Pixels>> + Send;

    fn encode(&self, pixels: &Self::Pixels) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Scale `pixels` by `factor`, updating its dimensions.
    fn scale(&self, pixels: &mut Self::Pixels, factor: f64)
        -> impl Future<Output = Result<()>> + Send;

    /// Replace `pixels` with the part inside `region`, updating its dimensions.
    /// Bounds checking is up to the implementation.
    fn crop(&self, pixels: &mut Self::Pixels, region: Rectangle)
        -> impl Future<Output = Result<()>> + Send;
}
