// src/handle.rs
//
// MutableImage: an encoded image that is decoded on first need, edited in
// place, and re-encoded only when the bytes are asked for.
//
// Lifecycle:
//   New --decode ok--> Decoded --scale/crop--> Decoded
//   New --codec cannot handle the bytes--> Undecodable (terminal)
//
// Decode runs at most once successfully; later calls reuse the decoded form.
// A failed decode leaves the handle in New so the caller may try again.

use crate::engine::{Codec, ImageCodec, PixelBuffer};
use crate::error::Result;
use crate::geometry::{Rectangle, Size};
use crate::ops::Edit;
use std::fmt;
use tracing::{debug, trace};

/// Observable lifecycle stage of a [`MutableImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Nothing decoded yet
    New,
    /// Pixels are materialized; edits apply to them
    Decoded,
    /// The codec cannot handle these bytes; the handle is a pass-through
    Undecodable,
}

// Explicit tri-state so "not tried yet" and "cannot be decoded" never collapse
// into the same `None`.
enum DecodeState<P> {
    Pending,
    Materialized(P),
    Unavailable,
}

/// The encoded bytes plus dimensions, as returned by
/// [`MutableImage::as_serialized`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializedImage<'a> {
    pub buffer: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// A lazily decoded, mutable image.
///
/// Construction is free; the first call that needs pixels decodes the buffer.
/// Edits (`scale`, `crop`) mutate the decoded form and are flushed back to
/// bytes by a single encode in [`as_serialized`](Self::as_serialized).
///
/// Every method takes `&mut self`: a handle has one owner and its operations
/// run one after another.
pub struct MutableImage<C: Codec = ImageCodec> {
    codec: C,
    encoded: Vec<u8>,
    state: DecodeState<C::Pixels>,
    width: u32,
    height: u32,
}

impl MutableImage<ImageCodec> {
    /// Wrap encoded bytes with the default [`ImageCodec`].
    pub fn new(encoded: impl Into<Vec<u8>>) -> Self {
        Self::with_codec(encoded, ImageCodec::default())
    }
}

impl<C: Codec> MutableImage<C> {
    pub fn with_codec(encoded: impl Into<Vec<u8>>, codec: C) -> Self {
        Self {
            codec,
            encoded: encoded.into(),
            state: DecodeState::Pending,
            width: 0,
            height: 0,
        }
    }

    pub fn state(&self) -> HandleState {
        match self.state {
            DecodeState::Pending => HandleState::New,
            DecodeState::Materialized(_) => HandleState::Decoded,
            DecodeState::Unavailable => HandleState::Undecodable,
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.state, DecodeState::Materialized(_))
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Current encoded bytes, without flushing pending edits.
    pub fn into_encoded(self) -> Vec<u8> {
        self.encoded
    }

    /// Image size, decoding first if needed. `0x0` when the codec cannot
    /// handle the bytes.
    pub async fn size(&mut self) -> Result<Size> {
        self.ensure_decoded().await?;
        Ok(Size::new(self.width, self.height))
    }

    /// Flush every edit to bytes and return them with the current size.
    ///
    /// When decoded, this encodes exactly once per call. When the codec cannot
    /// handle the bytes, the original buffer comes back untouched.
    pub async fn as_serialized(&mut self) -> Result<SerializedImage<'_>> {
        self.ensure_decoded().await?;
        self.ensure_encoded().await?;
        Ok(SerializedImage {
            buffer: &self.encoded,
            width: self.width,
            height: self.height,
        })
    }

    /// Scale the image by `factor`. No-op when the image cannot be decoded.
    pub async fn scale(&mut self, factor: f64) -> Result<()> {
        self.ensure_decoded().await?;
        let DecodeState::Materialized(pixels) = &mut self.state else {
            return Ok(());
        };
        let outcome = self.codec.scale(pixels, factor).await;
        self.sync_dimensions();
        log_outcome("scale", &outcome);
        trace!(factor, width = self.width, height = self.height, "scaled");
        outcome
    }

    /// Crop the image to `region`. No-op when the image cannot be decoded.
    /// Bounds are checked by the codec.
    pub async fn crop(&mut self, region: Rectangle) -> Result<()> {
        self.ensure_decoded().await?;
        let DecodeState::Materialized(pixels) = &mut self.state else {
            return Ok(());
        };
        let outcome = self.codec.crop(pixels, region).await;
        self.sync_dimensions();
        log_outcome("crop", &outcome);
        trace!(%region, width = self.width, height = self.height, "cropped");
        outcome
    }

    /// Apply a recorded edit.
    pub async fn apply(&mut self, edit: &Edit) -> Result<()> {
        match *edit {
            Edit::Scale { factor } => self.scale(factor).await,
            Edit::Crop { region } => self.crop(region).await,
        }
    }

    async fn ensure_decoded(&mut self) -> Result<()> {
        if !matches!(self.state, DecodeState::Pending) {
            return Ok(());
        }

        if !self.codec.can_decode(&self.encoded) {
            debug!(
                len = self.encoded.len(),
                "codec cannot handle buffer; passing it through"
            );
            self.state = DecodeState::Unavailable;
            return Ok(());
        }

        let decoded = self.codec.decode(&self.encoded).await;
        log_outcome("decode", &decoded);
        let pixels = decoded?;
        self.state = DecodeState::Materialized(pixels);
        self.sync_dimensions();
        debug!(width = self.width, height = self.height, "decoded");
        Ok(())
    }

    async fn ensure_encoded(&mut self) -> Result<()> {
        if let DecodeState::Materialized(pixels) = &self.state {
            self.encoded = self.codec.encode(pixels).await?;
            debug!(len = self.encoded.len(), "flushed edits");
        }
        Ok(())
    }

    // Also runs after a failed edit, so the cached size never drifts from
    // whatever the codec left behind.
    fn sync_dimensions(&mut self) {
        if let DecodeState::Materialized(pixels) = &self.state {
            (self.width, self.height) = pixels.dimensions();
        }
    }
}

fn log_outcome<T>(step: &'static str, outcome: &Result<T>) {
    if let Err(err) = outcome {
        debug!(step, category = err.category().as_str(), %err, "codec step failed");
    }
}

impl<C: Codec> fmt::Debug for MutableImage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableImage")
            .field("state", &self.state())
            .field("encoded_len", &self.encoded.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
