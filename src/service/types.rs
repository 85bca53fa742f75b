//! Service layer types

use serde::Serialize;

use crate::engine::StopReason;

/// Pipeline stage. A request moves forward through these in order and
/// ends in `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquiring,
    Decoding,
    Cropping,
    CompressLoop,
    Persisting,
    UpdatingRecord,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquiring => "acquiring",
            Stage::Decoding => "decoding",
            Stage::Cropping => "cropping",
            Stage::CompressLoop => "compress_loop",
            Stage::Persisting => "persisting",
            Stage::UpdatingRecord => "updating_record",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

/// Successful normalization of one cover
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeResult {
    pub url: String,
    pub key: String,
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub iterations: u32,
    pub stop: StopReason,
    pub elapsed_ms: u64,
}

/// Health check result
#[derive(Debug, Clone, Serialize)]
pub struct HealthResult {
    pub healthy: bool,
    pub version: String,
    pub format: String,
}
