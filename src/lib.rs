//! Cover Image Normalization Service Library

pub mod config;
pub mod error;
pub mod engine;
pub mod service;
pub mod storage;
pub mod api;

pub use config::Config;
pub use error::NormalizeError;
