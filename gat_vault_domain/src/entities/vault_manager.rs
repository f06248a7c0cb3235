// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vault Manager
//!
//! State machine owning a vault's key material lifecycle:
//!
//! ```text
//! LOCKED --unlock(password, salt?, verifier?)--> UNLOCKED
//! UNLOCKED --lock() / inactivity--> LOCKED
//! ```
//!
//! ## Key Lifecycle
//!
//! - Keys exist only in memory and only while the vault is UNLOCKED.
//! - `K_master` lives in a zeroizing buffer; `lock()` overwrites it and drops
//!   the subkey bundle (which wipes itself). Locking is idempotent.
//! - The inactivity timer uses the monotonic clock. `check_inactivity()` is
//!   called by the host on each touch; in-flight operations that already hold
//!   a key copy complete normally.
//! - `keys()` is the single capability through which callers obtain key
//!   material; every call refreshes the activity timestamp. No cipher, index,
//!   or trapdoor operation proceeds without it.
//!
//! The first unlock of a fresh vault mints the salt and returns
//! `(salt, verifier)` for the host to persist; later unlocks verify
//! `SHA-256(K_master)` against the stored verifier and fail with
//! `InvalidPassword` on mismatch, without any retry counting here.

use std::time::{Duration, Instant};
use zeroize::{Zeroize, Zeroizing};

use crate::error::SseError;
use crate::services::kdf::{
    derive_vault_keys, derive_vault_keys_from_password, generate_salt, password_verifier,
    KdfConfig, VaultKeyBundle, DERIVED_KEY_LEN, MIN_SALT_LEN,
};
use crate::services::trapdoor::constant_time_eq;

/// Default inactivity timeout before auto-lock.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);

/// Vault lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Locked,
    Unlocked,
}

/// Result of a successful unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// First unlock of a fresh vault: the caller must persist `salt` and
    /// `verifier` with the vault record.
    Created { salt: Vec<u8>, verifier: [u8; 32] },
    /// Unlock of an existing vault against its stored salt.
    Reopened,
}

/// Manages vault state and in-memory keys only.
///
/// Logically single-threaded: the host must ensure at most one unlock attempt
/// proceeds at a time. Dropping the manager wipes all key material.
pub struct VaultManager {
    state: VaultState,
    master_key: Option<Zeroizing<[u8; DERIVED_KEY_LEN]>>,
    keys: Option<VaultKeyBundle>,
    salt: Option<Vec<u8>>,
    inactivity_timeout: Option<Duration>,
    last_activity: Instant,
}

impl VaultManager {
    /// Creates a locked manager with the given inactivity timeout; `None`
    /// disables auto-lock.
    pub fn new(inactivity_timeout: Option<Duration>) -> Self {
        Self {
            state: VaultState::Locked,
            master_key: None,
            keys: None,
            salt: None,
            inactivity_timeout,
            last_activity: Instant::now(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// True when unlocked with key material present
    pub fn is_unlocked(&self) -> bool {
        self.state == VaultState::Unlocked && self.keys.is_some()
    }

    /// Stored salt, for host persistence. Not secret.
    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    /// Monotonic instant of the last key access
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Unlocks the vault with a password.
    ///
    /// When `salt` is `None` a fresh vault is being created: a salt is minted
    /// and returned together with the password verifier. Otherwise the
    /// derived verifier is checked against `stored_verifier` (when provided)
    /// in constant time.
    ///
    /// # Errors
    ///
    /// - `SseError::InvalidParameter` when the provided salt is shorter than
    ///   16 bytes
    /// - `SseError::InvalidPassword` on verifier mismatch
    pub fn unlock(
        &mut self,
        password: &[u8],
        salt: Option<&[u8]>,
        stored_verifier: Option<&[u8; 32]>,
        kdf: &KdfConfig,
    ) -> Result<UnlockOutcome, SseError> {
        let (salt_bytes, created) = match salt {
            Some(s) => {
                if s.len() < MIN_SALT_LEN {
                    return Err(SseError::invalid_parameter(format!(
                        "Salt must be at least {} bytes, got {}",
                        MIN_SALT_LEN,
                        s.len()
                    )));
                }
                (s.to_vec(), false)
            }
            None => (generate_salt()?.to_vec(), true),
        };

        let (k_master, bundle) = derive_vault_keys_from_password(password, &salt_bytes, kdf)?;
        let verifier = password_verifier(k_master.as_ref());
        if let Some(expected) = stored_verifier {
            if !constant_time_eq(&verifier, expected) {
                return Err(SseError::InvalidPassword);
            }
        }

        self.store_keys(k_master, bundle);
        self.salt = Some(salt_bytes.clone());

        if created {
            Ok(UnlockOutcome::Created {
                salt: salt_bytes,
                verifier,
            })
        } else {
            Ok(UnlockOutcome::Reopened)
        }
    }

    /// Unlocks from an existing master key, bypassing the password KDF.
    ///
    /// Used when the host already holds `K_master` (for example after
    /// envelope decryption of a stored key).
    pub fn unlock_with_master_key(&mut self, k_master: &[u8; DERIVED_KEY_LEN]) -> Result<(), SseError> {
        let bundle = derive_vault_keys(k_master)?;
        self.store_keys(Zeroizing::new(*k_master), bundle);
        self.salt = None;
        Ok(())
    }

    fn store_keys(&mut self, k_master: Zeroizing<[u8; DERIVED_KEY_LEN]>, bundle: VaultKeyBundle) {
        self.master_key = Some(k_master);
        self.keys = Some(bundle);
        self.state = VaultState::Unlocked;
        self.last_activity = Instant::now();
    }

    /// Locks the vault, overwriting `K_master` with zeros and dropping the
    /// subkeys. Idempotent; the salt is retained for re-unlock.
    pub fn lock(&mut self) {
        if let Some(mut master) = self.master_key.take() {
            master.zeroize();
        }
        if let Some(mut bundle) = self.keys.take() {
            bundle.zeroize();
        }
        self.state = VaultState::Locked;
    }

    /// Locks the vault when the inactivity timeout has elapsed. Returns
    /// whether a transition occurred.
    pub fn check_inactivity(&mut self) -> bool {
        if !self.is_unlocked() {
            return false;
        }
        let Some(timeout) = self.inactivity_timeout else {
            return false;
        };
        if timeout.is_zero() {
            return false;
        }
        if self.last_activity.elapsed() >= timeout {
            self.lock();
            return true;
        }
        false
    }

    /// Capability accessor for key material.
    ///
    /// Returns `None` when locked. Every call counts as activity for the
    /// inactivity timer. Callers must not persist the returned reference
    /// beyond the current operation.
    pub fn keys(&mut self) -> Option<&VaultKeyBundle> {
        if self.state != VaultState::Unlocked {
            return None;
        }
        self.last_activity = Instant::now();
        self.keys.as_ref()
    }
}

impl Drop for VaultManager {
    fn drop(&mut self) {
        self.lock();
    }
}
