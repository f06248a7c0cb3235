// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Cipher
//!
//! Authenticated encryption for document payloads: AES-256-GCM with a 96-bit
//! random nonce and 128-bit tag. The on-disk blob layout is part of the
//! external format and fixed as:
//!
//! ```text
//! nonce[12] || ciphertext[N] || tag[16]           (plain payload, N+28 bytes)
//! nonce[12] || ciphertext[N] || tag[16] || hmac[32]  (metadata-bound payload)
//! ```
//!
//! ## Security Properties
//!
//! - **Fresh nonces**: Every encryption draws a new nonce from the system
//!   CSPRNG. There is deliberately no deterministic-nonce entry point; GCM
//!   nonce reuse is catastrophic.
//! - **Fail-closed decryption**: A tag mismatch yields `SseError::AeadFailure`
//!   and no plaintext, partial or otherwise, is ever returned.
//! - **Metadata binding**: The optional trailing HMAC-SHA256 binds non-secret
//!   metadata (size, content type) to the blob. It is verified in constant
//!   time BEFORE the AEAD open so a stripped or swapped metadata field is
//!   rejected without touching the ciphertext.

use aes_gcm::{AeadInPlace, Aes256Gcm, Key, KeyInit, Nonce};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::SseError;
use crate::services::trapdoor::constant_time_eq;

/// GCM nonce length (96 bits, NIST-recommended).
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Metadata HMAC-SHA256 length.
pub const METADATA_MAC_LEN: usize = 32;

fn random_nonce() -> Result<[u8; NONCE_LEN], SseError> {
    let rng = SystemRandom::new();
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut nonce)
        .map_err(|_| SseError::io_error("System CSPRNG failed to produce a nonce"))?;
    Ok(nonce)
}

fn seal(plaintext: &[u8], k: &[u8; 32]) -> Result<Vec<u8>, SseError> {
    let nonce = random_nonce()?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(k));

    let mut buffer = plaintext.to_vec();
    cipher
        .encrypt_in_place(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| SseError::aead_failure("AES-256-GCM encryption failed"))?;

    // Nonce first, then ciphertext || tag.
    let mut blob = Vec::with_capacity(NONCE_LEN + buffer.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&buffer);
    Ok(blob)
}

fn open(blob: &[u8], k: &[u8; 32]) -> Result<Vec<u8>, SseError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Document blob too short: {} bytes",
            blob.len()
        )));
    }
    let (nonce, body) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(k));

    let mut buffer = body.to_vec();
    cipher
        .decrypt_in_place(Nonce::from_slice(nonce), b"", &mut buffer)
        .map_err(|_| SseError::aead_failure("AES-256-GCM tag verification failed"))?;
    Ok(buffer)
}

/// Encrypts a document payload into the storage blob
/// `nonce || ciphertext || tag`.
pub fn encrypt_document(plaintext: &[u8], k_file_enc: &[u8; 32]) -> Result<Vec<u8>, SseError> {
    seal(plaintext, k_file_enc)
}

/// Decrypts a storage blob produced by [`encrypt_document`].
///
/// # Errors
///
/// `SseError::AeadFailure` when the tag does not verify;
/// `SseError::InvalidParameter` when the blob is shorter than the fixed
/// framing.
pub fn decrypt_document(blob: &[u8], k_file_enc: &[u8; 32]) -> Result<Vec<u8>, SseError> {
    open(blob, k_file_enc)
}

/// HMAC binding for non-secret metadata: `be_u64(file_size) || extra`.
pub fn metadata_binding(k_file_enc: &[u8; 32], file_size: u64, extra: &[u8]) -> [u8; METADATA_MAC_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_file_enc);
    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(&file_size.to_be_bytes());
    ctx.update(extra);
    let tag = ctx.sign();
    let mut out = [0u8; METADATA_MAC_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Encrypts a document and appends `HMAC-SHA256(k, metadata)` after the tag.
pub fn encrypt_document_with_metadata(
    plaintext: &[u8],
    metadata: &[u8],
    k_file_enc: &[u8; 32],
) -> Result<Vec<u8>, SseError> {
    let mut blob = seal(plaintext, k_file_enc)?;
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_file_enc);
    let mac = hmac::sign(&key, metadata);
    blob.extend_from_slice(mac.as_ref());
    Ok(blob)
}

/// Decrypts a metadata-bound blob, verifying the metadata HMAC before the
/// AEAD open.
///
/// # Errors
///
/// `SseError::AeadFailure` when either the metadata HMAC or the GCM tag does
/// not verify.
pub fn decrypt_document_with_metadata(
    blob: &[u8],
    metadata: &[u8],
    k_file_enc: &[u8; 32],
) -> Result<Vec<u8>, SseError> {
    if blob.len() < NONCE_LEN + TAG_LEN + METADATA_MAC_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Metadata-bound blob too short: {} bytes",
            blob.len()
        )));
    }
    let (body, stored_mac) = blob.split_at(blob.len() - METADATA_MAC_LEN);
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_file_enc);
    let expected = hmac::sign(&key, metadata);
    if !constant_time_eq(expected.as_ref(), stored_mac) {
        return Err(SseError::aead_failure("Metadata integrity check failed"));
    }
    open(body, k_file_enc)
}
