//! Crop and resize geometry for cover images

use serde::Serialize;

use crate::config::CompressionConfig;

/// Region extracted from the source image before resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both sides by `factor`, rounding to the nearest pixel
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: (self.width as f64 * factor).round() as u32,
            height: (self.height as f64 * factor).round() as u32,
        }
    }

    pub fn fits_within(&self, bounds: Dimensions) -> bool {
        self.width <= bounds.width && self.height <= bounds.height
    }
}

/// Target aspect ratio expressed as width / height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const PORTRAIT_3_4: AspectRatio = AspectRatio { width: 3, height: 4 };

    pub fn value(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Compute the centered crop matching `ratio` for a `width` x `height` image.
///
/// Wider images lose columns on both sides; taller (or exactly matching)
/// images lose rows top and bottom. Offsets are floored, lengths rounded.
pub fn compute_crop(width: u32, height: u32, ratio: AspectRatio) -> CropRect {
    let target = ratio.value();
    let (w, h) = (width as f64, height as f64);

    if w / h > target {
        let crop_width = ((h * target).round() as u32).clamp(1, width);
        CropRect {
            left: (width - crop_width) / 2,
            top: 0,
            width: crop_width,
            height,
        }
    } else {
        let crop_height = ((w / target).round() as u32).clamp(1, height);
        CropRect {
            left: 0,
            top: (height - crop_height) / 2,
            width,
            height: crop_height,
        }
    }
}

/// Initial resize target: fit `crop` inside `bounds` without ever upscaling
pub fn initial_resize(crop: &CropRect, bounds: Dimensions) -> Dimensions {
    let scale = f64::min(
        bounds.width as f64 / crop.width as f64,
        bounds.height as f64 / crop.height as f64,
    );

    if scale < 1.0 {
        Dimensions {
            width: ((crop.width as f64 * scale).round() as u32).max(1),
            height: ((crop.height as f64 * scale).round() as u32).max(1),
        }
    } else {
        Dimensions::new(crop.width, crop.height)
    }
}

impl From<&CompressionConfig> for AspectRatio {
    fn from(config: &CompressionConfig) -> Self {
        AspectRatio {
            width: config.target_ratio_w,
            height: config.target_ratio_h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Dimensions = Dimensions { width: 900, height: 1200 };

    #[test]
    fn test_landscape_crop_narrows_width() {
        let crop = compute_crop(4000, 3000, AspectRatio::PORTRAIT_3_4);
        assert_eq!(crop, CropRect { left: 875, top: 0, width: 2250, height: 3000 });

        let target = initial_resize(&crop, BOUNDS);
        assert_eq!(target, Dimensions::new(900, 1200));
    }

    #[test]
    fn test_tall_crop_shortens_height() {
        let crop = compute_crop(600, 1000, AspectRatio::PORTRAIT_3_4);
        assert_eq!(crop, CropRect { left: 0, top: 100, width: 600, height: 800 });

        // Already inside the bounds, no resize
        let target = initial_resize(&crop, BOUNDS);
        assert_eq!(target, Dimensions::new(600, 800));
    }

    #[test]
    fn test_exact_ratio_is_untouched() {
        let crop = compute_crop(300, 400, AspectRatio::PORTRAIT_3_4);
        assert_eq!(crop, CropRect { left: 0, top: 0, width: 300, height: 400 });
    }

    #[test]
    fn test_single_pixel_image() {
        let crop = compute_crop(1, 1, AspectRatio::PORTRAIT_3_4);
        assert_eq!(crop, CropRect { left: 0, top: 0, width: 1, height: 1 });
        assert_eq!(initial_resize(&crop, BOUNDS), Dimensions::new(1, 1));
    }

    #[test]
    fn test_crop_properties_hold_across_shapes() {
        let ratio = AspectRatio::PORTRAIT_3_4;
        for width in (1..=2000).step_by(37) {
            for height in (1..=2000).step_by(41) {
                let crop = compute_crop(width, height, ratio);
                assert!(crop.left + crop.width <= width, "{}x{} -> {:?}", width, height, crop);
                assert!(crop.top + crop.height <= height, "{}x{} -> {:?}", width, height, crop);

                if width as f64 / height as f64 > ratio.value() {
                    assert_eq!(crop.top, 0);
                    assert_eq!(crop.height, height);
                    // Within rounding of one pixel on the cropped side
                    let ideal = height as f64 * ratio.value();
                    assert!((crop.width as f64 - ideal).abs() <= 1.0);
                } else {
                    assert_eq!(crop.left, 0);
                    assert_eq!(crop.width, width);
                    let ideal = width as f64 / ratio.value();
                    assert!((crop.height as f64 - ideal).abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_resize_never_upscales() {
        for (w, h) in [(90, 120), (2250, 3000), (3000, 4000), (900, 1200), (1200, 1600)] {
            let crop = CropRect { left: 0, top: 0, width: w, height: h };
            let target = initial_resize(&crop, BOUNDS);
            assert!(target.width <= w && target.height <= h);
            assert!(target.fits_within(BOUNDS));
        }
    }

    #[test]
    fn test_scaled_rounds() {
        assert_eq!(Dimensions::new(900, 1200).scaled(0.8), Dimensions::new(720, 960));
        assert_eq!(Dimensions::new(720, 960).scaled(0.8), Dimensions::new(576, 768));
    }
}
