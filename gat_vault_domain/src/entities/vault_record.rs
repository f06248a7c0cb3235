// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vault Record
//!
//! The non-secret, host-persisted description of a vault: identifier, owner,
//! display name, KDF salt, and password verifier. Nothing in this record can
//! decrypt data; the salt is public by design and the verifier is a
//! non-reversible SHA-256 of `K_master`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SseError;
use crate::services::kdf::MIN_SALT_LEN;

/// Server-persisted vault record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Unique vault identifier
    pub vault_id: Uuid,
    /// Owning user identifier (opaque to the core)
    pub user_id: String,
    /// Display name chosen by the user
    pub name: String,
    /// KDF salt, at least 16 bytes; not secret
    pub salt: Vec<u8>,
    /// `SHA-256(K_master)` password verifier
    pub verifier: [u8; 32],
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl VaultRecord {
    /// Creates a record for a freshly created vault.
    ///
    /// # Errors
    ///
    /// Returns `SseError::InvalidParameter` when the salt is shorter than 16
    /// bytes or the name is empty.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        salt: Vec<u8>,
        verifier: [u8; 32],
    ) -> Result<Self, SseError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SseError::invalid_parameter("Vault name must not be empty"));
        }
        if salt.len() < MIN_SALT_LEN {
            return Err(SseError::invalid_parameter(format!(
                "Salt must be at least {} bytes, got {}",
                MIN_SALT_LEN,
                salt.len()
            )));
        }
        Ok(Self {
            vault_id: Uuid::new_v4(),
            user_id: user_id.into(),
            name,
            salt,
            verifier,
            created_at: Utc::now(),
        })
    }
}
