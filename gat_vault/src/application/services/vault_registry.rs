// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vault Registry
//!
//! Explicit owner of per-vault managers, keyed by `(user_id, vault_id)`. The
//! service boundary constructs one registry at startup and tears it down at
//! shutdown; nothing in the engine reaches for ambient global state.
//!
//! The registry also resolves each vault's storage directory
//! (`<base>/<user_id>/<vault_id>`) and produces the dashboard statistics the
//! host exposes: encrypted file count and bytes, index size, algorithm names,
//! and lock state. Statistics never include key material or plaintext.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gat_vault_domain::entities::{UnlockOutcome, VaultManager, VaultState};
use gat_vault_domain::services::kdf::KdfConfig;
use gat_vault_domain::{SseError, VaultKeyBundle};

use crate::infrastructure::repositories::json_index_backend::JSON_INDEX_FILE;
use crate::infrastructure::repositories::sqlite_index_backend::SQLITE_INDEX_FILE;

/// Dashboard statistics for one vault.
#[derive(Debug, Clone, Serialize)]
pub struct VaultStats {
    pub total_encrypted_files: u64,
    pub total_encrypted_size_bytes: u64,
    pub index_size_bytes: u64,
    pub encryption_algorithm: &'static str,
    pub kdf_algorithm: &'static str,
    pub vault_state: &'static str,
    /// Seconds since the last key access; `None` while locked
    pub seconds_since_last_activity: Option<u64>,
}

/// Owner of per-vault managers and storage layout.
pub struct VaultRegistry {
    base_dir: PathBuf,
    inactivity_timeout: Option<Duration>,
    vaults: Mutex<HashMap<(String, String), VaultManager>>,
}

impl VaultRegistry {
    /// Creates a registry rooted at `base_dir`, applying `inactivity_timeout`
    /// to every vault it creates.
    pub fn new(base_dir: impl Into<PathBuf>, inactivity_timeout: Option<Duration>) -> Self {
        Self {
            base_dir: base_dir.into(),
            inactivity_timeout,
            vaults: Mutex::new(HashMap::new()),
        }
    }

    /// Storage directory for one vault's documents, index, and metadata.
    pub fn storage_dir(&self, user_id: &str, vault_id: &str) -> PathBuf {
        self.base_dir.join(user_id).join(vault_id)
    }

    /// Unlocks (creating the manager on first touch). See
    /// [`VaultManager::unlock`] for salt/verifier semantics.
    pub fn unlock(
        &self,
        user_id: &str,
        vault_id: &str,
        password: &[u8],
        salt: Option<&[u8]>,
        verifier: Option<&[u8; 32]>,
        kdf: &KdfConfig,
    ) -> Result<UnlockOutcome, SseError> {
        let mut vaults = self.vaults.lock();
        let manager = vaults
            .entry((user_id.to_string(), vault_id.to_string()))
            .or_insert_with(|| VaultManager::new(self.inactivity_timeout));
        manager.unlock(password, salt, verifier, kdf)
    }

    /// Manually locks one vault; no-op when the vault was never touched.
    pub fn lock(&self, user_id: &str, vault_id: &str) {
        if let Some(manager) = self
            .vaults
            .lock()
            .get_mut(&(user_id.to_string(), vault_id.to_string()))
        {
            manager.lock();
        }
    }

    /// Applies the inactivity timer to one vault. Returns whether it locked.
    pub fn check_inactivity(&self, user_id: &str, vault_id: &str) -> bool {
        self.vaults
            .lock()
            .get_mut(&(user_id.to_string(), vault_id.to_string()))
            .map(|m| m.check_inactivity())
            .unwrap_or(false)
    }

    /// Capability accessor: runs `f` with the vault's key bundle.
    ///
    /// # Errors
    ///
    /// `SseError::VaultLocked` when the vault is locked or unknown.
    pub fn with_keys<R>(
        &self,
        user_id: &str,
        vault_id: &str,
        f: impl FnOnce(&VaultKeyBundle) -> R,
    ) -> Result<R, SseError> {
        let mut vaults = self.vaults.lock();
        let manager = vaults
            .get_mut(&(user_id.to_string(), vault_id.to_string()))
            .ok_or(SseError::VaultLocked)?;
        let keys = manager.keys().ok_or(SseError::VaultLocked)?;
        Ok(f(keys))
    }

    /// Clones the key bundle for handing to a client engine. The clone wipes
    /// itself independently.
    pub fn client_keys(&self, user_id: &str, vault_id: &str) -> Result<VaultKeyBundle, SseError> {
        self.with_keys(user_id, vault_id, |keys| keys.clone())
    }

    /// Dashboard statistics for one vault.
    pub fn stats(&self, user_id: &str, vault_id: &str) -> Result<VaultStats, SseError> {
        let storage_dir = self.storage_dir(user_id, vault_id);
        let (total_files, total_bytes) = dir_totals(&storage_dir.join("documents"))?;
        let index_size = file_size(&storage_dir.join(SQLITE_INDEX_FILE))?
            .or(file_size(&storage_dir.join(JSON_INDEX_FILE))?)
            .unwrap_or(0);

        let mut vaults = self.vaults.lock();
        let (state, idle) = match vaults.get_mut(&(user_id.to_string(), vault_id.to_string())) {
            Some(manager) if manager.state() == VaultState::Unlocked => {
                ("UNLOCKED", Some(manager.last_activity().elapsed().as_secs()))
            }
            _ => ("LOCKED", None),
        };

        Ok(VaultStats {
            total_encrypted_files: total_files,
            total_encrypted_size_bytes: total_bytes,
            index_size_bytes: index_size,
            encryption_algorithm: "AES-256-GCM",
            kdf_algorithm: "scrypt",
            vault_state: state,
            seconds_since_last_activity: idle,
        })
    }

    /// Locks every vault; called at service shutdown.
    pub fn lock_all(&self) {
        for manager in self.vaults.lock().values_mut() {
            manager.lock();
        }
        tracing::info!("locked all vaults");
    }
}

impl Drop for VaultRegistry {
    fn drop(&mut self) {
        self.lock_all();
    }
}

fn dir_totals(dir: &Path) -> Result<(u64, u64), SseError> {
    if !dir.exists() {
        return Ok((0, 0));
    }
    let mut files = 0u64;
    let mut bytes = 0u64;
    for entry in std::fs::read_dir(dir)
        .map_err(|e| SseError::io_error(format!("Failed to read {}: {}", dir.display(), e)))?
    {
        let entry = entry.map_err(|e| SseError::io_error(e.to_string()))?;
        let meta = entry.metadata().map_err(|e| SseError::io_error(e.to_string()))?;
        if meta.is_file() {
            files += 1;
            bytes += meta.len();
        }
    }
    Ok((files, bytes))
}

fn file_size(path: &Path) -> Result<Option<u64>, SseError> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::metadata(path)
        .map(|m| Some(m.len()))
        .map_err(|e| SseError::io_error(format!("Failed to stat {}: {}", path.display(), e)))
}
