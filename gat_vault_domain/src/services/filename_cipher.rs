// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filename Cipher
//!
//! AES-256-GCM over UTF-8 filenames under the dedicated `k_filename_enc`
//! subkey. Unlike document blobs, the three AEAD components are kept as
//! separate base64url fields in a [`FilenameRecord`] so the record can live
//! inside the per-vault JSON metadata document.
//!
//! Nonces are drawn fresh per encryption; the same filename encrypted twice
//! yields different records.

use aes_gcm::{AeadInPlace, Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::SseError;
use crate::services::document_cipher::{NONCE_LEN, TAG_LEN};
use crate::value_objects::FilenameRecord;

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, SseError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| SseError::invalid_parameter(format!("Invalid base64url in {}: {}", name, e)))
}

/// Encrypts a filename into a structured record.
pub fn encrypt_filename(name: &str, k_filename_enc: &[u8; 32]) -> Result<FilenameRecord, SseError> {
    let rng = SystemRandom::new();
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut nonce)
        .map_err(|_| SseError::io_error("System CSPRNG failed to produce a nonce"))?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(k_filename_enc));
    let mut buffer = name.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| SseError::aead_failure("Filename encryption failed"))?;

    Ok(FilenameRecord {
        encrypted_filename: URL_SAFE_NO_PAD.encode(&buffer),
        filename_iv: URL_SAFE_NO_PAD.encode(nonce),
        filename_tag: URL_SAFE_NO_PAD.encode(tag),
    })
}

/// Decrypts a filename record back to the UTF-8 name.
///
/// # Errors
///
/// - `SseError::InvalidParameter` on malformed base64 or wrong component
///   lengths
/// - `SseError::AeadFailure` when the tag does not verify or the plaintext is
///   not valid UTF-8
pub fn decrypt_filename(record: &FilenameRecord, k_filename_enc: &[u8; 32]) -> Result<String, SseError> {
    let ciphertext = decode_field("encrypted_filename", &record.encrypted_filename)?;
    let nonce = decode_field("filename_iv", &record.filename_iv)?;
    let tag = decode_field("filename_tag", &record.filename_tag)?;

    if nonce.len() != NONCE_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Filename nonce must be {} bytes, got {}",
            NONCE_LEN,
            nonce.len()
        )));
    }
    if tag.len() != TAG_LEN {
        return Err(SseError::invalid_parameter(format!(
            "Filename tag must be {} bytes, got {}",
            TAG_LEN,
            tag.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(k_filename_enc));
    let mut buffer = ciphertext;
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&nonce),
            b"",
            &mut buffer,
            aes_gcm::Tag::from_slice(&tag),
        )
        .map_err(|_| SseError::aead_failure("Filename tag verification failed"))?;

    String::from_utf8(buffer)
        .map_err(|_| SseError::aead_failure("Decrypted filename is not valid UTF-8"))
}
