//! Progressive compression loop
//!
//! Re-encodes the cropped image, first lowering quality inside the current
//! dimension tier and then shrinking the dimensions, until the artifact fits
//! under the byte ceiling or the dimension floor is reached.

use std::time::{Duration, Instant};

use image::{imageops::FilterType, DynamicImage};
use serde::Serialize;
use tracing::{debug, warn};

use super::encoder::CoverEncoder;
use super::geometry::{CropRect, Dimensions};
use crate::config::CompressionConfig;
use crate::error::Result;

/// Parameters of the compression loop
#[derive(Debug, Clone)]
pub struct CompressionLimits {
    pub max_size_kb: u32,
    pub initial_quality: u8,
    pub quality_step: u8,
    /// Quality is stepped down only while strictly above this value
    pub min_quality: u8,
    pub reset_quality: u8,
    pub shrink_factor: f64,
    /// A shrink producing a width OR height below this ends the loop
    pub min_dimension: u32,
    pub max_iterations: u32,
    pub deadline: Option<Duration>,
}

impl Default for CompressionLimits {
    fn default() -> Self {
        Self::from(&CompressionConfig::default())
    }
}

impl From<&CompressionConfig> for CompressionLimits {
    fn from(config: &CompressionConfig) -> Self {
        Self {
            max_size_kb: config.max_size_kb,
            initial_quality: config.initial_quality,
            quality_step: config.quality_step,
            min_quality: config.min_quality,
            reset_quality: config.reset_quality,
            shrink_factor: config.shrink_factor,
            min_dimension: config.min_dimension,
            max_iterations: config.max_iterations.max(1),
            deadline: (config.deadline_secs > 0).then(|| Duration::from_secs(config.deadline_secs)),
        }
    }
}

impl CompressionLimits {
    fn fits(&self, len: usize) -> bool {
        len as f64 / 1024.0 <= self.max_size_kb as f64
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    WithinLimit,
    /// The next shrink would cross the minimum dimension; last buffer emitted as is
    DimensionFloor,
    IterationCap,
    Deadline,
}

impl StopReason {
    pub fn is_best_effort(&self) -> bool {
        !matches!(self, StopReason::WithinLimit)
    }
}

/// Final encoded buffer and the parameters that produced it
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub iterations: u32,
    pub stop: StopReason,
}

/// Run the loop on `source`, cropped to `crop` and resized to start at `target`
pub fn compress_to_limit(
    source: &DynamicImage,
    crop: CropRect,
    target: Dimensions,
    encoder: &dyn CoverEncoder,
    limits: &CompressionLimits,
) -> Result<CompressionOutcome> {
    let started = Instant::now();
    let cropped = source.crop_imm(crop.left, crop.top, crop.width, crop.height);

    let mut quality = limits.initial_quality;
    let mut dims = target;
    let mut resized = resize_to(&cropped, dims);
    let mut iterations = 0u32;

    loop {
        iterations += 1;
        let data = encoder.encode(&resized, quality)?;
        debug!(
            "Encode #{} at {}x{} q{} -> {} bytes",
            iterations, dims.width, dims.height, quality, data.len()
        );

        let finish = |data: Vec<u8>, stop: StopReason| CompressionOutcome {
            data,
            width: dims.width,
            height: dims.height,
            quality,
            iterations,
            stop,
        };

        if limits.fits(data.len()) {
            return Ok(finish(data, StopReason::WithinLimit));
        }

        // Floor is decided before the cap and deadline checks
        let shrink_to = if quality > limits.min_quality {
            None
        } else {
            let next = dims.scaled(limits.shrink_factor);
            if next.width < limits.min_dimension || next.height < limits.min_dimension {
                warn!(
                    "Reached dimension floor at {}x{}, emitting oversized {} bytes",
                    dims.width, dims.height, data.len()
                );
                return Ok(finish(data, StopReason::DimensionFloor));
            }
            Some(next)
        };

        if iterations >= limits.max_iterations {
            warn!("Compression stopped after {} iterations, emitting {} bytes", iterations, data.len());
            return Ok(finish(data, StopReason::IterationCap));
        }

        if let Some(deadline) = limits.deadline {
            if started.elapsed() >= deadline {
                warn!("Compression deadline of {:?} reached, emitting {} bytes", deadline, data.len());
                return Ok(finish(data, StopReason::Deadline));
            }
        }

        match shrink_to {
            None => quality = quality.saturating_sub(limits.quality_step),
            Some(next) => {
                dims = next;
                quality = limits.reset_quality;
                resized = resize_to(&cropped, dims);
            }
        }
    }
}

fn resize_to(image: &DynamicImage, dims: Dimensions) -> DynamicImage {
    if image.width() == dims.width && image.height() == dims.height {
        image.clone()
    } else {
        image.resize_exact(dims.width, dims.height, FilterType::Lanczos3)
    }
}
