// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # JSON-to-SQLite Index Migration
//!
//! Vaults that started on the JSON backend move to SQLite in one shot: when
//! `index.json` exists and `index.db` does not, every entry is imported into
//! the SQLite schema inside a single transaction and the JSON file is renamed
//! to `index.json.bak`. The migrated index yields byte-identical `entries()`
//! output.
//!
//! A JSON file that fails to parse aborts the migration with
//! `SseError::CorruptedStore`; nothing is renamed and nothing is written, so
//! the operator can repair or restore the original file.

use std::collections::BTreeMap;
use std::path::Path;

use gat_vault_domain::repositories::IndexBackend;
use gat_vault_domain::SseError;

use super::json_index_backend::JSON_INDEX_FILE;
use super::sqlite_index_backend::{SqliteIndexBackend, SQLITE_INDEX_FILE};

/// Suffix appended to the JSON index after a successful import.
pub const JSON_BACKUP_FILE: &str = "index.json.bak";

/// Migrates `index.json` into `index.db` if (and only if) the former exists
/// and the latter does not. Returns whether a migration ran.
pub async fn migrate_json_index(storage_dir: &Path) -> Result<bool, SseError> {
    let json_path = storage_dir.join(JSON_INDEX_FILE);
    let db_path = storage_dir.join(SQLITE_INDEX_FILE);

    if !json_path.exists() {
        return Ok(false);
    }
    if db_path.exists() {
        // Already on SQLite; never overwrite.
        return Ok(false);
    }

    let raw = std::fs::read_to_string(&json_path)
        .map_err(|e| SseError::io_error(format!("Failed to read {}: {}", json_path.display(), e)))?;
    let entries: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw).map_err(|e| {
        SseError::corrupted_store(format!(
            "Index file {} failed to parse during migration: {}",
            json_path.display(),
            e
        ))
    })?;

    let backend = SqliteIndexBackend::open(storage_dir).await?;
    backend.add_batch(&entries).await?;
    backend.close().await?;

    let backup_path = storage_dir.join(JSON_BACKUP_FILE);
    std::fs::rename(&json_path, &backup_path).map_err(|e| {
        SseError::io_error(format!(
            "Migrated index but failed to rename {} to {}: {}",
            json_path.display(),
            backup_path.display(),
            e
        ))
    })?;

    tracing::info!(
        dir = %storage_dir.display(),
        tokens = entries.len(),
        "migrated JSON index to SQLite"
    );
    Ok(true)
}
