//! Storage abstraction traits
//!
//! The object store holds encoded artifacts; the record store holds the
//! business rows that point at them. Both are injected into the service.

use async_trait::async_trait;

use crate::error::Result;

/// Artifact storage with public retrieval URLs
/// Implementations must be thread-safe and async-compatible
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Write `data` at `path`. With `upsert` an existing object is replaced,
    /// otherwise an existing object is a `Storage` error.
    async fn put(&self, path: &str, data: &[u8], content_type: &str, upsert: bool) -> Result<()>;

    /// Canonical public URL for `path`
    async fn public_url(&self, path: &str) -> Result<String>;
}

/// Business record store
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Point the record `identifier` at `url`
    async fn update_record_image(&self, identifier: &str, url: &str) -> Result<()>;
}

/// Storage key for an identifier's artifact: `<folder>/<identifier>.<ext>`
pub fn artifact_key(folder: &str, identifier: &str, extension: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}.{}", identifier, extension)
    } else {
        format!("{}/{}.{}", folder, identifier, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_key() {
        assert_eq!(artifact_key("covers", "biz-42", "webp"), "covers/biz-42.webp");
        assert_eq!(artifact_key("/covers/", "biz-42", "jpg"), "covers/biz-42.jpg");
        assert_eq!(artifact_key("", "biz-42", "webp"), "biz-42.webp");
    }
}
