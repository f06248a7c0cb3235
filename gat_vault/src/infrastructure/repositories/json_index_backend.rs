// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # JSON Index Backend
//!
//! File-backed implementation of the `IndexBackend` port: the whole index is
//! held in memory as an ordered map and persisted as a single JSON object
//! `{ token_hex: [doc_id, ...] }`.
//!
//! Every mutation rewrites the file atomically (write to a temp file in the
//! same directory, then rename) so a crash mid-write can never leave a torn
//! index behind. A file that fails to parse on open is a
//! `SseError::CorruptedStore` requiring manual repair; it is never silently
//! replaced with an empty index.
//!
//! Suited to small vaults and to tests; larger corpora use the SQLite
//! backend with the identical contract.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use gat_vault_domain::repositories::IndexBackend;
use gat_vault_domain::SseError;

/// Index filename inside a vault storage directory.
pub const JSON_INDEX_FILE: &str = "index.json";

/// In-memory, JSON-persisted index backend.
#[derive(Debug)]
pub struct JsonIndexBackend {
    path: PathBuf,
    index: RwLock<BTreeMap<String, Vec<String>>>,
}

fn merge_dedupe(existing: &mut Vec<String>, incoming: &[String]) {
    let mut seen: HashSet<String> = existing.iter().cloned().collect();
    for doc_id in incoming {
        if seen.insert(doc_id.clone()) {
            existing.push(doc_id.clone());
        }
    }
}

impl JsonIndexBackend {
    /// Opens (or creates) the backend at `<dir>/index.json`.
    ///
    /// # Errors
    ///
    /// `SseError::CorruptedStore` when an existing file fails to parse;
    /// `SseError::IoError` on filesystem failures.
    pub fn open(storage_dir: &Path) -> Result<Self, SseError> {
        let path = storage_dir.join(JSON_INDEX_FILE);
        let index = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| SseError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
            serde_json::from_str::<BTreeMap<String, Vec<String>>>(&raw).map_err(|e| {
                SseError::corrupted_store(format!("Index file {} failed to parse: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), tokens = index.len(), "opened JSON index backend");
        Ok(Self {
            path,
            index: RwLock::new(index),
        })
    }

    fn save(&self, index: &BTreeMap<String, Vec<String>>) -> Result<(), SseError> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| SseError::io_error("Index path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| SseError::io_error(format!("Failed to create {}: {}", parent.display(), e)))?;

        let data = serde_json::to_vec_pretty(index)
            .map_err(|e| SseError::serialization_error(format!("Index serialization failed: {}", e)))?;

        // Write-to-temp then rename keeps the on-disk index whole under
        // crashes.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| SseError::io_error(format!("Failed to create temp index file: {}", e)))?;
        tmp.write_all(&data)
            .map_err(|e| SseError::io_error(format!("Failed to write temp index file: {}", e)))?;
        tmp.persist(&self.path)
            .map_err(|e| SseError::io_error(format!("Failed to persist index file: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl IndexBackend for JsonIndexBackend {
    async fn add(&self, token_hex: &str, doc_ids: &[String]) -> Result<(), SseError> {
        let mut index = self.index.write();
        merge_dedupe(index.entry(token_hex.to_string()).or_default(), doc_ids);
        self.save(&index)
    }

    async fn add_batch(&self, batch: &BTreeMap<String, Vec<String>>) -> Result<(), SseError> {
        let mut index = self.index.write();
        for (token_hex, doc_ids) in batch {
            merge_dedupe(index.entry(token_hex.clone()).or_default(), doc_ids);
        }
        self.save(&index)
    }

    async fn entries(&self) -> Result<Vec<(String, Vec<String>)>, SseError> {
        let index = self.index.read();
        Ok(index.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn remove_doc_id(&self, doc_id: &str) -> Result<(), SseError> {
        let mut index = self.index.write();
        index.retain(|_, doc_ids| {
            doc_ids.retain(|d| d != doc_id);
            !doc_ids.is_empty()
        });
        self.save(&index)
    }

    async fn bytes_per_doc(&self) -> Result<HashMap<String, u64>, SseError> {
        let index = self.index.read();
        let mut out: HashMap<String, u64> = HashMap::new();
        for (token_hex, doc_ids) in index.iter() {
            if doc_ids.is_empty() {
                continue;
            }
            // Entry size split equally among the docs sharing the entry.
            let entry_size = token_hex.len() as u64
                + doc_ids.iter().map(|d| d.len() as u64).sum::<u64>()
                + 2 * doc_ids.len() as u64;
            let per_doc = entry_size / doc_ids.len() as u64;
            for doc_id in doc_ids {
                *out.entry(doc_id.clone()).or_insert(0) += per_doc;
            }
        }
        Ok(out)
    }
}
