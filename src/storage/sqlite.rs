//! SQLite record store for business rows

use std::path::Path;

use async_trait::async_trait;
use sqlx::{sqlite::{SqlitePool, SqlitePoolOptions}, Row};
use tracing::{info, debug};

use super::traits::RecordStore;
use crate::error::{NormalizeError, Result};

/// A business row as far as cover images are concerned
#[derive(Debug, Clone)]
pub struct BusinessRecord {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub updated_at: i64,
}

/// SQLite-based record store
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

fn storage_err(e: sqlx::Error) -> NormalizeError {
    NormalizeError::Storage(e.to_string())
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl SqliteRecordStore {
    /// Open (or create) the database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| NormalizeError::Storage(e.to_string()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", db_path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .map_err(|e| NormalizeError::Storage(format!("Failed to connect to SQLite database: {}", e)))?;

        let store = Self { pool };
        store.initialize().await?;

        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS business (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                image TEXT,
                updated_at INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        info!("SQLite record store initialized");
        Ok(())
    }

    /// Insert or rename a business row, keeping its image pointer
    pub async fn upsert_business(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO business (id, name, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(now_secs())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    pub async fn get_business(&self, id: &str) -> Result<Option<BusinessRecord>> {
        let row = sqlx::query("SELECT id, name, image, updated_at FROM business WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.map(|row| BusinessRecord {
            id: row.get("id"),
            name: row.get("name"),
            image: row.get("image"),
            updated_at: row.get("updated_at"),
        }))
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn update_record_image(&self, identifier: &str, url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE business SET image = ?, updated_at = ? WHERE id = ?")
            .bind(url)
            .bind(now_secs())
            .bind(identifier)
            .execute(&self.pool)
            .await
            .map_err(|e| NormalizeError::RecordUpdate(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(NormalizeError::RecordUpdate(format!(
                "no business record with id {}",
                identifier
            )));
        }

        debug!("Business {} image -> {}", identifier, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_update_record_image() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("business.db");
        let store = SqliteRecordStore::new(db_path.to_str().unwrap()).await.unwrap();

        store.upsert_business("biz-1", "Cactus Cafe").await.unwrap();
        assert!(store.get_business("biz-1").await.unwrap().unwrap().image.is_none());

        store
            .update_record_image("biz-1", "http://cdn.test/covers/biz-1.webp")
            .await
            .unwrap();

        let record = store.get_business("biz-1").await.unwrap().unwrap();
        assert_eq!(record.name, "Cactus Cafe");
        assert_eq!(record.image.as_deref(), Some("http://cdn.test/covers/biz-1.webp"));

        // Renaming keeps the pointer
        store.upsert_business("biz-1", "Cactus Cafe & Bar").await.unwrap();
        let record = store.get_business("biz-1").await.unwrap().unwrap();
        assert_eq!(record.image.as_deref(), Some("http://cdn.test/covers/biz-1.webp"));
    }

    #[tokio::test]
    async fn test_missing_record_is_update_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("business.db");
        let store = SqliteRecordStore::new(db_path.to_str().unwrap()).await.unwrap();

        let err = store.update_record_image("nope", "http://x").await.unwrap_err();
        assert!(matches!(err, NormalizeError::RecordUpdate(_)));
    }
}
