//! Image normalization engine
//!
//! - Byte acquisition from URLs or base64 payloads
//! - Decoding with limits and EXIF orientation
//! - Fixed-ratio center crop and bounded resize
//! - Size-bounded progressive re-encoding

pub mod source;
pub mod decode;
pub mod geometry;
pub mod encoder;
pub mod compress;
pub mod normalizer;

pub use source::ImageFetcher;
pub use encoder::{CoverEncoder, WebpEncoder, JpegEncoder};
pub use compress::{CompressionLimits, CompressionOutcome, StopReason};
pub use geometry::{CropRect, Dimensions, AspectRatio};
pub use normalizer::{CoverNormalizer, NormalizedCover};
