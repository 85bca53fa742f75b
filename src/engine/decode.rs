//! Image decoding with decoder limits and EXIF orientation handling

use std::io::Cursor;

use image::{DynamicImage, ImageReader, Limits};

use crate::error::{NormalizeError, Result};

/// Decode options
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Largest accepted width or height
    pub max_dimension: u32,
    pub apply_exif_orientation: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 16384,
            apply_exif_orientation: true,
        }
    }
}

/// Decode image bytes of any supported format.
///
/// Dimension limits are enforced by the reader before pixel buffers are
/// allocated, so a small compressed payload cannot expand unbounded.
pub fn decode_image(data: &[u8], options: DecodeOptions) -> Result<DynamicImage> {
    if data.is_empty() {
        return Err(NormalizeError::Decode("empty image buffer".to_string()));
    }

    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(options.max_dimension);
    limits.max_image_height = Some(options.max_dimension);
    reader.limits(limits);

    let image = reader.decode()?;

    if options.apply_exif_orientation {
        Ok(apply_exif_orientation(data, image))
    } else {
        Ok(image)
    }
}

/// Rotate/flip pixels according to the EXIF orientation tag.
/// Phone cameras usually store rotation as a tag instead of rotating pixels.
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1),
        Err(_) => 1,
    };

    // https://exiftool.org/TagNames/EXIF.html (Orientation)
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image(&png_bytes(40, 30), DecodeOptions::default()).unwrap();
        assert_eq!((img.width(), img.height()), (40, 30));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_image(b"definitely not an image", DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_empty_is_decode_error() {
        let err = decode_image(&[], DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_dimension_limit_rejects_oversized() {
        let options = DecodeOptions {
            max_dimension: 32,
            apply_exif_orientation: false,
        };
        let err = decode_image(&png_bytes(64, 16), options).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }
}
