//! Service layer module

pub mod cover_service;
pub mod types;

pub use cover_service::CoverService;
pub use types::*;
