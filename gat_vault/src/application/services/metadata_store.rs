// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metadata Store
//!
//! Persistence for the per-vault metadata document (`metadata.json`):
//! filename records and the forward-privacy keyword counter. A missing file
//! reads as empty metadata; a file that fails to parse is
//! `SseError::CorruptedStore` and is never silently replaced. Saves are
//! atomic (temp file + rename) like the JSON index.

use std::io::Write;
use std::path::{Path, PathBuf};

use gat_vault_domain::value_objects::{Filename, VaultMetadata};
use gat_vault_domain::SseError;

/// Metadata filename inside a vault storage directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Loads and saves one vault's metadata document.
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Creates a store over `<dir>/metadata.json`.
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            path: storage_dir.join(METADATA_FILE),
        }
    }

    /// Reads the metadata document; a missing file yields empty metadata.
    ///
    /// # Errors
    ///
    /// `SseError::CorruptedStore` when an existing file fails to parse.
    pub fn load(&self) -> Result<VaultMetadata, SseError> {
        if !self.path.exists() {
            return Ok(VaultMetadata::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| SseError::io_error(format!("Failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| {
            SseError::corrupted_store(format!(
                "Metadata file {} failed to parse: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Writes the metadata document atomically.
    pub fn save(&self, metadata: &VaultMetadata) -> Result<(), SseError> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| SseError::io_error("Metadata path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| SseError::io_error(format!("Failed to create {}: {}", parent.display(), e)))?;

        let data = serde_json::to_vec_pretty(metadata)
            .map_err(|e| SseError::serialization_error(format!("Metadata serialization failed: {}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| SseError::io_error(format!("Failed to create temp metadata file: {}", e)))?;
        tmp.write_all(&data)
            .map_err(|e| SseError::io_error(format!("Failed to write temp metadata file: {}", e)))?;
        tmp.persist(&self.path)
            .map_err(|e| SseError::io_error(format!("Failed to persist metadata file: {}", e)))?;
        Ok(())
    }

    /// Records a filename for a document and saves immediately.
    pub fn record_filename(&self, doc_id: &str, filename: Filename) -> Result<(), SseError> {
        let mut metadata = self.load()?;
        metadata.set_filename(doc_id, filename);
        self.save(&metadata)
    }

    /// Removes a document's filename entry and saves; returns whether an
    /// entry existed.
    pub fn forget_document(&self, doc_id: &str) -> Result<bool, SseError> {
        let mut metadata = self.load()?;
        let existed = metadata.remove_file(doc_id);
        if existed {
            self.save(&metadata)?;
        }
        Ok(existed)
    }
}
