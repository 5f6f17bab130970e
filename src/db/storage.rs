//! Key-value blob storage behind every entity store.
//!
//! The contract mirrors browser storage: `get(key) -> Option<String>` and
//! `set(key, value)`, plus a revision counter bumped on every write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{now_timestamp, RevisionInfo};

/// Injected blob storage.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replace the blob stored under `key` and bump the revision.
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Current revision and the time of the last write.
    async fn revision(&self) -> Result<RevisionInfo, AppError>;
}

fn check_quota(key: &str, value: &str, quota: Option<usize>) -> Result<(), AppError> {
    match quota {
        Some(quota) if value.len() > quota => Err(AppError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}

// ==================== IN-MEMORY STORAGE ====================

struct MemoryState {
    entries: HashMap<String, String>,
    revision_id: i64,
    generated_at: String,
}

/// Process-local storage used by tests and throwaway runs.
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                entries: HashMap::new(),
                revision_id: 0,
                generated_at: now_timestamp(),
            }),
            quota: None,
        }
    }

    /// Reject blobs larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Write a raw value without quota checks or revision bump.
    #[cfg(test)]
    pub async fn insert_raw(&self, key: &str, value: &str) {
        let mut state = self.state.write().await;
        state.entries.insert(key.to_string(), value.to_string());
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let state = self.state.read().await;
        Ok(state.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        check_quota(key, value, self.quota)?;

        let mut state = self.state.write().await;
        state.entries.insert(key.to_string(), value.to_string());
        state.revision_id += 1;
        state.generated_at = now_timestamp();
        Ok(())
    }

    async fn revision(&self) -> Result<RevisionInfo, AppError> {
        let state = self.state.read().await;
        Ok(RevisionInfo {
            revision_id: state.revision_id,
            generated_at: state.generated_at.clone(),
        })
    }
}

// ==================== SQLITE STORAGE ====================

/// Durable storage in the `kv_store` table.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    quota: Option<usize>,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, quota: None }
    }

    /// Reject blobs larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        check_quota(key, value, self.quota)?;

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn revision(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_storage_get_set() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "[1]").await.unwrap();
        storage.set("k", "[2]").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(storage.revision().await.unwrap().revision_id, 2);
    }

    #[tokio::test]
    async fn test_memory_storage_quota() {
        let storage = MemoryStorage::new().with_quota(4);
        storage.set("k", "[1]").await.unwrap();

        let err = storage.set("k", "[1,2,3]").await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { size: 7, quota: 4, .. }));
        // Failed write leaves the previous value and revision untouched
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.revision().await.unwrap().revision_id, 1);
    }

    #[tokio::test]
    async fn test_sqlite_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("kv.sqlite"))
            .await
            .unwrap();
        let storage = SqliteStorage::new(pool);

        assert_eq!(storage.get("donorops.blog").await.unwrap(), None);
        let initial = storage.revision().await.unwrap().revision_id;

        storage.set("donorops.blog", "[]").await.unwrap();
        storage.set("donorops.blog", "[{\"slug\":\"a\"}]").await.unwrap();

        assert_eq!(
            storage.get("donorops.blog").await.unwrap().as_deref(),
            Some("[{\"slug\":\"a\"}]")
        );
        assert_eq!(storage.revision().await.unwrap().revision_id, initial + 2);
    }

    #[tokio::test]
    async fn test_sqlite_storage_quota() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("kv.sqlite"))
            .await
            .unwrap();
        let storage = SqliteStorage::new(pool).with_quota(8);

        let err = storage.set("k", "0123456789").await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { .. }));
        assert_eq!(storage.get("k").await.unwrap(), None);
    }
}
