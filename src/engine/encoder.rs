//! Lossy artifact encoders
//!
//! The compression loop only needs "encode at quality q" plus the metadata
//! used to name and serve the artifact, so encoders sit behind a trait.

use image::{codecs::jpeg, DynamicImage, ExtendedColorType, ImageEncoder};

use crate::config::OutputFormat;
use crate::error::{NormalizeError, Result};

pub trait CoverEncoder: Send + Sync + 'static {
    /// Encode `image` at `quality` (1-100)
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>>;

    /// File extension used in the storage key
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;
}

/// Lossy WebP, keeps the alpha channel when the source has one
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpEncoder;

impl CoverEncoder for WebpEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let quality = quality.clamp(1, 100) as f32;
        let encoded = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
            encoder.encode_simple(false, quality).map(|m| m.to_vec())
        } else {
            let rgb = image.to_rgb8();
            let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
            encoder.encode_simple(false, quality).map(|m| m.to_vec())
        };

        encoded.map_err(|e| NormalizeError::Encode(format!("webp: {:?}", e)))
    }

    fn extension(&self) -> &'static str {
        "webp"
    }

    fn content_type(&self) -> &'static str {
        "image/webp"
    }
}

/// Baseline JPEG; alpha is flattened
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder;

impl CoverEncoder for JpegEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| NormalizeError::Encode(e.to_string()))?;
        Ok(buf)
    }

    fn extension(&self) -> &'static str {
        "jpg"
    }

    fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// Build the encoder selected in configuration
pub fn encoder_for(format: OutputFormat) -> Box<dyn CoverEncoder> {
    match format {
        OutputFormat::Webp => Box::new(WebpEncoder),
        OutputFormat::Jpeg => Box::new(JpegEncoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x ^ y) % 256) as u8])
        }))
    }

    #[test]
    fn test_webp_output_is_riff_webp() {
        let data = WebpEncoder.encode(&gradient(64, 48), 80).unwrap();
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn test_webp_keeps_alpha_images_decodable() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 128])));
        let data = WebpEncoder.encode(&img, 70).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let img = gradient(256, 256);
        let high = JpegEncoder.encode(&img, 95).unwrap();
        let low = JpegEncoder.encode(&img, 15).unwrap();
        assert!(low.len() < high.len());
        assert_eq!(&high[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encoder_for_format() {
        assert_eq!(encoder_for(OutputFormat::Webp).content_type(), "image/webp");
        assert_eq!(encoder_for(OutputFormat::Jpeg).extension(), "jpg");
    }
}
