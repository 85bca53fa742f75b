//! Filesystem object store
//!
//! Objects live under a root directory; keys map to relative paths. Writes go
//! through a temporary file in the destination directory that is renamed into
//! place, so readers never observe a partially written artifact.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::traits::ObjectStore;
use crate::error::{NormalizeError, Result};

pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| NormalizeError::Storage(format!("cannot create {:?}: {}", root, e)))?;
        info!("Local object store at {:?}", root);

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` under the root, rejecting keys that would escape it
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(NormalizeError::Storage(format!("invalid object key: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

fn write_atomic(dest: &Path, data: &[u8], upsert: bool) -> Result<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| NormalizeError::Storage(format!("no parent directory for {:?}", dest)))?;
    std::fs::create_dir_all(dir).map_err(|e| NormalizeError::Storage(e.to_string()))?;

    // Dropped (and removed) on every early return
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| NormalizeError::Storage(e.to_string()))?;
    staged
        .write_all(data)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| NormalizeError::Storage(e.to_string()))?;

    let persisted = if upsert {
        staged.persist(dest)
    } else {
        staged.persist_noclobber(dest)
    };
    persisted.map_err(|e| NormalizeError::Storage(format!("cannot write {:?}: {}", dest, e.error)))?;
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, data: &[u8], content_type: &str, upsert: bool) -> Result<()> {
        let dest = self.resolve(path)?;
        let data = data.to_vec();
        let len = data.len();

        tokio::task::spawn_blocking(move || write_atomic(&dest, &data, upsert)).await??;

        debug!("Stored {} ({} bytes, {})", path, len, content_type);
        Ok(())
    }

    async fn public_url(&self, path: &str) -> Result<String> {
        self.resolve(path)?;
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}
