//! Decode → crop → compress, each step run synchronously on a blocking worker

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use super::compress::{compress_to_limit, CompressionLimits, CompressionOutcome};
use super::decode::{decode_image, DecodeOptions};
use super::encoder::{encoder_for, CoverEncoder};
use super::geometry::{compute_crop, initial_resize, AspectRatio, CropRect, Dimensions};
use crate::config::Config;
use crate::error::Result;

/// Result of normalizing one source image
#[derive(Debug, Clone)]
pub struct NormalizedCover {
    pub source: Dimensions,
    pub crop: CropRect,
    pub target: Dimensions,
    pub outcome: CompressionOutcome,
}

/// CPU-bound part of the pipeline. Holds no per-request state.
pub struct CoverNormalizer {
    ratio: AspectRatio,
    bounds: Dimensions,
    limits: CompressionLimits,
    decode: DecodeOptions,
    encoder: Box<dyn CoverEncoder>,
}

impl CoverNormalizer {
    pub fn new(
        ratio: AspectRatio,
        bounds: Dimensions,
        limits: CompressionLimits,
        decode: DecodeOptions,
        encoder: Box<dyn CoverEncoder>,
    ) -> Self {
        Self {
            ratio,
            bounds,
            limits,
            decode,
            encoder,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AspectRatio::from(&config.compression),
            Dimensions::new(config.compression.max_width, config.compression.max_height),
            CompressionLimits::from(&config.compression),
            DecodeOptions {
                max_dimension: config.limits.max_image_dimension,
                apply_exif_orientation: config.images.apply_exif_orientation,
            },
            encoder_for(config.compression.format),
        )
    }

    pub fn encoder(&self) -> &dyn CoverEncoder {
        self.encoder.as_ref()
    }

    /// Decode `data` with the configured limits and orientation handling
    pub fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        decode_image(data, self.decode)
    }

    /// Centered crop of `image` and the bounded size it is first resized to
    pub fn plan(&self, image: &DynamicImage) -> (CropRect, Dimensions) {
        let (width, height) = image.dimensions();
        let crop = compute_crop(width, height, self.ratio);
        let target = initial_resize(&crop, self.bounds);
        debug!(
            "Source {}x{}, crop {:?}, initial target {}x{}",
            width, height, crop, target.width, target.height
        );
        (crop, target)
    }

    pub fn compress(
        &self,
        image: &DynamicImage,
        crop: CropRect,
        target: Dimensions,
    ) -> Result<CompressionOutcome> {
        compress_to_limit(image, crop, target, self.encoder.as_ref(), &self.limits)
    }

    /// All three steps in one call
    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedCover> {
        let image = self.decode(data)?;
        let (crop, target) = self.plan(&image);
        let outcome = self.compress(&image, crop, target)?;

        Ok(NormalizedCover {
            source: Dimensions::new(image.width(), image.height()),
            crop,
            target,
            outcome,
        })
    }
}
