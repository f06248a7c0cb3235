// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Index Backend
//!
//! SQLite-backed implementation of the `IndexBackend` port: one row per
//! `(token_hex, doc_id)` pair. Scales to large document sets while preserving
//! the contract of the JSON backend exactly.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS index_entries (
//!     token_hex TEXT NOT NULL,
//!     doc_id TEXT NOT NULL,
//!     UNIQUE(token_hex, doc_id)
//! );
//! CREATE INDEX IF NOT EXISTS idx_key ON index_entries(token_hex);
//! ```
//!
//! The `UNIQUE` constraint plus `INSERT OR IGNORE` makes pair insertion
//! idempotent; `rowid` ordering within a token preserves first-insertion
//! order for deterministic iteration. Batches execute inside a single
//! transaction so a concurrent reader sees all of a batch or none of it.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use gat_vault_domain::repositories::IndexBackend;
use gat_vault_domain::SseError;

/// Index filename inside a vault storage directory.
pub const SQLITE_INDEX_FILE: &str = "index.db";

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS index_entries (token_hex TEXT NOT NULL, doc_id TEXT NOT NULL, UNIQUE(token_hex, doc_id))";
const CREATE_INDEX_SQL: &str = "CREATE INDEX IF NOT EXISTS idx_key ON index_entries(token_hex)";

/// SQLite-backed index backend.
pub struct SqliteIndexBackend {
    pool: SqlitePool,
}

impl SqliteIndexBackend {
    /// Opens (or creates) the backend at `<dir>/index.db` and ensures the
    /// schema exists.
    pub async fn open(storage_dir: &Path) -> Result<Self, SseError> {
        std::fs::create_dir_all(storage_dir)
            .map_err(|e| SseError::io_error(format!("Failed to create {}: {}", storage_dir.display(), e)))?;
        let path = storage_dir.join(SQLITE_INDEX_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        // Writes are serialized by the storage server; one connection keeps
        // SQLite locking simple.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                SseError::database_error(format!("Failed to open index db {}: {}", path.display(), e))
            })?;
        let backend = Self { pool };
        backend.ensure_schema().await?;
        tracing::debug!(path = %path.display(), "opened SQLite index backend");
        Ok(backend)
    }

    /// In-memory backend for tests.
    pub async fn in_memory() -> Result<Self, SseError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await
            .map_err(|e| SseError::database_error(format!("Failed to open in-memory index db: {}", e)))?;
        let backend = Self { pool };
        backend.ensure_schema().await?;
        Ok(backend)
    }

    async fn ensure_schema(&self) -> Result<(), SseError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| SseError::corrupted_store(format!("Failed to create index schema: {}", e)))?;
        sqlx::query(CREATE_INDEX_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| SseError::corrupted_store(format!("Failed to create token index: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl IndexBackend for SqliteIndexBackend {
    async fn add(&self, token_hex: &str, doc_ids: &[String]) -> Result<(), SseError> {
        let mut batch = BTreeMap::new();
        batch.insert(token_hex.to_string(), doc_ids.to_vec());
        self.add_batch(&batch).await
    }

    async fn add_batch(&self, batch: &BTreeMap<String, Vec<String>>) -> Result<(), SseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SseError::database_error(format!("Failed to begin index transaction: {}", e)))?;
        for (token_hex, doc_ids) in batch {
            for doc_id in doc_ids {
                sqlx::query("INSERT OR IGNORE INTO index_entries (token_hex, doc_id) VALUES (?, ?)")
                    .bind(token_hex)
                    .bind(doc_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| SseError::database_error(format!("Failed to insert index pair: {}", e)))?;
            }
        }
        tx.commit()
            .await
            .map_err(|e| SseError::database_error(format!("Failed to commit index batch: {}", e)))?;
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, Vec<String>)>, SseError> {
        let rows = sqlx::query("SELECT token_hex, doc_id FROM index_entries ORDER BY token_hex, rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SseError::database_error(format!("Failed to scan index entries: {}", e)))?;

        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for row in rows {
            let token_hex: String = row.get("token_hex");
            let doc_id: String = row.get("doc_id");
            match out.last_mut() {
                Some((current, doc_ids)) if *current == token_hex => doc_ids.push(doc_id),
                _ => out.push((token_hex, vec![doc_id])),
            }
        }
        Ok(out)
    }

    async fn remove_doc_id(&self, doc_id: &str) -> Result<(), SseError> {
        sqlx::query("DELETE FROM index_entries WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SseError::database_error(format!("Failed to purge doc from index: {}", e)))?;
        Ok(())
    }

    async fn bytes_per_doc(&self) -> Result<HashMap<String, u64>, SseError> {
        let rows = sqlx::query(
            "SELECT doc_id, SUM(LENGTH(token_hex) + LENGTH(doc_id)) AS bytes FROM index_entries GROUP BY doc_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SseError::database_error(format!("Failed to compute index footprint: {}", e)))?;

        let mut out = HashMap::new();
        for row in rows {
            let doc_id: String = row.get("doc_id");
            let bytes: i64 = row.get("bytes");
            out.insert(doc_id, bytes.max(0) as u64);
        }
        Ok(out)
    }

    async fn close(&self) -> Result<(), SseError> {
        self.pool.close().await;
        Ok(())
    }
}
