// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Derivation and the Vault Key Bundle
//!
//! This module derives all vault key material. A password and a per-vault
//! salt produce the 32-byte master key `K_master` via scrypt (or
//! PBKDF2-HMAC-SHA256 as the portable fallback); HKDF-SHA256 then expands
//! `K_master` into five domain-separated 32-byte subkeys:
//!
//! | Subkey | Info string | Purpose |
//! |--------|-------------|---------|
//! | `k_file_enc` | `vault.v1.k_file_enc` | AES-256-GCM over documents |
//! | `k_filename_enc` | `vault.v1.k_filename_enc` | AES-256-GCM over filenames |
//! | `k_search` | `vault.v1.k_search` | Trapdoor HMAC |
//! | `k_index` | `vault.v1.k_index` | Reserved (derived, unused) |
//! | `k_index_mac` | `vault.v1.k_index_mac` | HMAC over index blocks |
//!
//! ## Security Properties
//!
//! - **Domain separation**: Distinct HKDF info strings make the subkeys
//!   cryptographically independent (RFC 5869); compromise of one subkey does
//!   not reveal another.
//! - **Password hardening**: scrypt with N >= 8192, r = 8, p = 1 by default;
//!   production deployments are expected to raise N to 32768 via
//!   configuration. PBKDF2 requires at least 200 000 iterations.
//! - **Verifier**: `SHA-256(K_master)` is stored with the salt so a wrong
//!   password is rejected at unlock without keeping `K_master` at rest.
//! - **Zeroization**: The bundle wipes its subkeys on drop; `K_master` is
//!   handed out only inside a `Zeroizing` buffer.
//!
//! The salt is not secret and is persisted with the vault record.

use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::SseError;

/// Derived key length for every subkey: AES-256 and HMAC-SHA256 both take
/// 32-byte keys.
pub const DERIVED_KEY_LEN: usize = 32;

/// Random salt length minted for new vaults.
pub const SALT_LEN: usize = 32;

/// Shortest salt accepted by the KDFs.
pub const MIN_SALT_LEN: usize = 16;

/// PBKDF2 iteration floor.
pub const MIN_PBKDF2_ITERATIONS: u32 = 200_000;

// HKDF info strings; distinct to ensure independent keys (RFC 5869).
const INFO_K_FILE_ENC: &[u8] = b"vault.v1.k_file_enc";
const INFO_K_FILENAME_ENC: &[u8] = b"vault.v1.k_filename_enc";
const INFO_K_SEARCH: &[u8] = b"vault.v1.k_search";
const INFO_K_INDEX: &[u8] = b"vault.v1.k_index";
const INFO_K_INDEX_MAC: &[u8] = b"vault.v1.k_index_mac";

/// scrypt cost parameters.
///
/// `log_n` is the base-2 logarithm of the CPU/memory cost factor N. Defaults
/// follow the portable profile (N = 8192, r = 8, p = 1); hosts raise N
/// through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        // N = 8192
        Self { log_n: 13, r: 8, p: 1 }
    }
}

impl ScryptParams {
    /// Builds parameters from a raw cost factor N.
    ///
    /// # Errors
    ///
    /// Returns `SseError::InvalidParameter` when N is not a power of two or
    /// is below 2.
    pub fn from_cost(n: u64, r: u32, p: u32) -> Result<Self, SseError> {
        if n < 2 || !n.is_power_of_two() {
            return Err(SseError::invalid_parameter(format!(
                "scrypt N must be a power of two >= 2, got {}",
                n
            )));
        }
        Ok(Self {
            log_n: n.trailing_zeros() as u8,
            r,
            p,
        })
    }
}

/// Password-hardening KDF selection for unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfConfig {
    /// scrypt with explicit cost parameters (default)
    Scrypt(ScryptParams),
    /// PBKDF2-HMAC-SHA256 with an explicit iteration count
    Pbkdf2 { iterations: u32 },
}

impl Default for KdfConfig {
    fn default() -> Self {
        KdfConfig::Scrypt(ScryptParams::default())
    }
}

/// Derived keys for one vault. All subkeys are 32 bytes.
///
/// The bundle lives only in client memory while the vault is unlocked and is
/// wiped on drop. `Clone` exists so a capability holder can hand a working
/// copy to the client engine; every copy wipes itself independently.
#[derive(Clone)]
pub struct VaultKeyBundle {
    /// AES-256-GCM key for document payloads
    pub k_file_enc: [u8; DERIVED_KEY_LEN],
    /// AES-256-GCM key for filename records
    pub k_filename_enc: [u8; DERIVED_KEY_LEN],
    /// HMAC key for trapdoors and forward-private derivation
    pub k_search: [u8; DERIVED_KEY_LEN],
    /// Reserved: derived for forward compatibility, unused by the baseline
    /// index
    pub k_index: [u8; DERIVED_KEY_LEN],
    /// HMAC key protecting index blocks and entries
    pub k_index_mac: [u8; DERIVED_KEY_LEN],
}

impl Zeroize for VaultKeyBundle {
    fn zeroize(&mut self) {
        self.k_file_enc.zeroize();
        self.k_filename_enc.zeroize();
        self.k_search.zeroize();
        self.k_index.zeroize();
        self.k_index_mac.zeroize();
    }
}

impl ZeroizeOnDrop for VaultKeyBundle {}

impl std::fmt::Debug for VaultKeyBundle {
    // Key bytes must never reach logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKeyBundle{..}")
    }
}

/// Generates a random salt for a new vault. Not secret; persisted with the
/// vault record.
pub fn generate_salt() -> Result<[u8; SALT_LEN], SseError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| SseError::io_error("System CSPRNG failed to produce a salt"))?;
    Ok(salt)
}

/// Derives `K_master` from a password using scrypt.
///
/// # Errors
///
/// Returns `SseError::InvalidParameter` when the salt is shorter than 16
/// bytes or the cost parameters are rejected by the scrypt implementation.
pub fn scrypt_derive(
    password: &[u8],
    salt: &[u8],
    params: &ScryptParams,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, SseError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Salt must be at least {} bytes, got {}",
            MIN_SALT_LEN,
            salt.len()
        )));
    }
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, DERIVED_KEY_LEN)
        .map_err(|e| SseError::invalid_parameter(format!("Invalid scrypt parameters: {}", e)))?;
    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    scrypt::scrypt(password, salt, &scrypt_params, &mut *out)
        .map_err(|e| SseError::invalid_parameter(format!("scrypt derivation failed: {}", e)))?;
    Ok(out)
}

/// Derives `K_master` from a password using PBKDF2-HMAC-SHA256.
///
/// # Errors
///
/// Returns `SseError::InvalidParameter` when the salt is shorter than 16
/// bytes or the iteration count is below 200 000.
pub fn pbkdf2_derive(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, SseError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Salt must be at least {} bytes, got {}",
            MIN_SALT_LEN,
            salt.len()
        )));
    }
    if iterations < MIN_PBKDF2_ITERATIONS {
        return Err(SseError::invalid_parameter(format!(
            "PBKDF2 iterations must be at least {}, got {}",
            MIN_PBKDF2_ITERATIONS, iterations
        )));
    }
    let iterations = std::num::NonZeroU32::new(iterations)
        .ok_or_else(|| SseError::invalid_parameter("PBKDF2 iterations must be non-zero"))?;
    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        &mut *out,
    );
    Ok(out)
}

/// Derives the master key according to the selected KDF.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    kdf: &KdfConfig,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, SseError> {
    match kdf {
        KdfConfig::Scrypt(params) => scrypt_derive(password, salt, params),
        KdfConfig::Pbkdf2 { iterations } => pbkdf2_derive(password, salt, *iterations),
    }
}

/// Expands one 32-byte subkey out of the HKDF PRK.
fn expand_subkey(prk: &hkdf::Prk, info: &'static [u8]) -> Result<[u8; DERIVED_KEY_LEN], SseError> {
    let info_slice = [info];
    let okm = prk
        .expand(&info_slice, hkdf::HKDF_SHA256)
        .map_err(|_| SseError::invalid_parameter("HKDF-Expand failed"))?;
    let mut out = [0u8; DERIVED_KEY_LEN];
    okm.fill(&mut out)
        .map_err(|_| SseError::invalid_parameter("HKDF output fill failed"))?;
    Ok(out)
}

/// Derives the five vault subkeys from `K_master` via HKDF-SHA256.
///
/// Extract uses an empty salt, which is sound because `K_master` is already
/// high-entropy KDF output.
///
/// # Errors
///
/// Returns `SseError::InvalidParameter` when `K_master` is shorter than 32
/// bytes.
pub fn derive_vault_keys(k_master: &[u8]) -> Result<VaultKeyBundle, SseError> {
    if k_master.len() < DERIVED_KEY_LEN {
        return Err(SseError::invalid_parameter(format!(
            "K_master must be at least 32 bytes, got {}",
            k_master.len()
        )));
    }
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, &[]).extract(k_master);
    Ok(VaultKeyBundle {
        k_file_enc: expand_subkey(&prk, INFO_K_FILE_ENC)?,
        k_filename_enc: expand_subkey(&prk, INFO_K_FILENAME_ENC)?,
        k_search: expand_subkey(&prk, INFO_K_SEARCH)?,
        k_index: expand_subkey(&prk, INFO_K_INDEX)?,
        k_index_mac: expand_subkey(&prk, INFO_K_INDEX_MAC)?,
    })
}

/// Derives `K_master` and the full bundle in one step.
pub fn derive_vault_keys_from_password(
    password: &[u8],
    salt: &[u8],
    kdf: &KdfConfig,
) -> Result<(Zeroizing<[u8; DERIVED_KEY_LEN]>, VaultKeyBundle), SseError> {
    let k_master = derive_master_key(password, salt, kdf)?;
    let bundle = derive_vault_keys(k_master.as_ref())?;
    Ok((k_master, bundle))
}

/// Password verifier: `SHA-256(K_master)`.
///
/// Stored with the salt; lets unlock reject a wrong password without keeping
/// `K_master` at rest. Non-reversible.
pub fn password_verifier(k_master: &[u8]) -> [u8; 32] {
    Sha256::digest(k_master).into()
}
