// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filename Value Objects
//!
//! Filenames in vault metadata come in two historical shapes: a legacy
//! plaintext string, or a structured record holding the AES-256-GCM
//! components of an encrypted filename. This module models that as a tagged
//! sum so every caller must handle both shapes explicitly instead of probing
//! a dynamic value.
//!
//! ## On-Disk Format
//!
//! The encrypted record serializes as:
//!
//! ```json
//! { "encrypted_filename": "<b64url>", "filename_iv": "<b64url>", "filename_tag": "<b64url>" }
//! ```
//!
//! All fields are base64url without padding. The legacy shape is a bare JSON
//! string; `serde(untagged)` accepts both when reading existing metadata.

use serde::{Deserialize, Serialize};

/// Structured encrypted-filename record.
///
/// Components of one AES-256-GCM encryption under `K_filename_enc`:
/// ciphertext, 12-byte nonce, and 16-byte tag, each base64url-encoded
/// without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameRecord {
    /// Base64url ciphertext of the UTF-8 filename
    pub encrypted_filename: String,
    /// Base64url 96-bit GCM nonce
    pub filename_iv: String,
    /// Base64url 128-bit GCM tag
    pub filename_tag: String,
}

/// A filename as stored in per-vault metadata: legacy plaintext or an
/// encrypted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filename {
    /// Structured encrypted record (current format)
    Encrypted(FilenameRecord),
    /// Plaintext filename (legacy vaults only)
    Plain(String),
}

impl Filename {
    /// Returns true when the filename is stored encrypted
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Filename::Encrypted(_))
    }
}
