// src/engine/image_codec.rs
//
// Default Codec backed by the image/mozjpeg/zune-png/webp/fast_image_resize
// stack. All pixel work runs on the worker pool (see pool.rs).

use crate::engine::codec::{Codec, PixelBuffer};
use crate::engine::config::CodecConfig;
use crate::engine::pool::defer;
use crate::engine::{decoder, encoder, transform};
use crate::error::Result;
use crate::geometry::Rectangle;
use image::{DynamicImage, ImageFormat};
use std::sync::Arc;

/// Decoded pixels plus the format they were decoded from.
///
/// The pixel data sits behind an `Arc` so a worker can read it while the
/// owning handle keeps its copy; an edit swaps in a new buffer only once the
/// worker has finished.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    image: Arc<DynamicImage>,
    source_format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, source_format: Option<ImageFormat>) -> Self {
        Self {
            image: Arc::new(image),
            source_format,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }
}

impl PixelBuffer for DecodedImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ImageCodec {
    config: Arc<CodecConfig>,
}

impl ImageCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl Codec for ImageCodec {
    type Pixels = DecodedImage;

    fn can_decode(&self, encoded: &[u8]) -> bool {
        decoder::can_decode(encoded)
    }

    async fn decode(&self, encoded: &[u8]) -> Result<DecodedImage> {
        let bytes = encoded.to_vec();
        let config = Arc::clone(&self.config);
        let (image, format) =
            defer("decode", move || decoder::decode_image(&bytes, &config)).await??;
        Ok(DecodedImage::new(image, format))
    }

    async fn encode(&self, pixels: &DecodedImage) -> Result<Vec<u8>> {
        let image = Arc::clone(&pixels.image);
        let format = encoder::resolve_output(self.config.output, pixels.source_format);
        defer("encode", move || encoder::encode_image(&image, format)).await?
    }

    async fn scale(&self, pixels: &mut DecodedImage, factor: f64) -> Result<()> {
        let image = Arc::clone(&pixels.image);
        let config = Arc::clone(&self.config);
        let scaled =
            defer("scale", move || transform::scale_image(&image, factor, &config)).await??;
        pixels.image = Arc::new(scaled);
        Ok(())
    }

    async fn crop(&self, pixels: &mut DecodedImage, region: Rectangle) -> Result<()> {
        let image = Arc::clone(&pixels.image);
        let cropped = defer("crop", move || transform::crop_image(&image, region)).await??;
        pixels.image = Arc::new(cropped);
        Ok(())
    }
}
