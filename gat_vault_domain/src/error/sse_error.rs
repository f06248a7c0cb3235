// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the error system for the vault SSE domain. It
//! categorizes failures of the cryptographic engine, the encrypted index, and
//! the vault lifecycle so that callers can react to each class of failure
//! deterministically.
//!
//! ## Error Categories
//!
//! ### Authentication and Lifecycle
//! - **InvalidPassword**: Unlock attempted with a password whose derived
//!   verifier does not match the stored one
//! - **VaultLocked**: An operation that needs key material was attempted
//!   while the vault was locked
//!
//! ### Cryptographic Failures
//! - **AeadFailure**: AES-GCM tag verification failed during document or
//!   filename decryption; always fatal for that decrypt
//! - **IndexTampered**: An index block or entry MAC did not verify; no
//!   partial results may be returned
//!
//! ### Preconditions and Storage
//! - **InvalidParameter**: A caller violated a documented precondition
//!   (salt too short, wrong key length, KDF iterations too low, bad base64)
//! - **NotFound**: A document lookup missed; soft, surfaced as-is
//! - **CorruptedStore**: A persisted index or metadata file failed to parse;
//!   fatal, requires manual repair
//! - **IoError** / **DatabaseError** / **SerializationError**: Infrastructure
//!   failures wrapped with non-secret context
//!
//! ## Security Considerations
//!
//! Error payloads carry only non-secret context: lengths, operation names,
//! file paths. Key material, plaintext, and passwords never appear in an
//! error message.

use thiserror::Error;

/// Domain-specific errors for the vault SSE engine.
///
/// Each variant represents a specific failure mode and carries a descriptive,
/// non-secret message. AEAD and MAC failures are fatal for the operation that
/// raised them; `NotFound` and the empty-counter case in forward-private
/// search are the only soft conditions.
#[derive(Error, Debug, Clone)]
pub enum SseError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Vault is locked")]
    VaultLocked,

    #[error("Authenticated decryption failed: {0}")]
    AeadFailure(String),

    #[error("Index integrity check failed: {0}")]
    IndexTampered(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Corrupted store: {0}")]
    CorruptedStore(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SseError {
    /// Creates a new AEAD failure error
    pub fn aead_failure(msg: impl Into<String>) -> Self {
        Self::AeadFailure(msg.into())
    }

    /// Creates a new index tampering error
    pub fn index_tampered(msg: impl Into<String>) -> Self {
        Self::IndexTampered(msg.into())
    }

    /// Creates a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a new invalid-parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a new corrupted-store error
    pub fn corrupted_store(msg: impl Into<String>) -> Self {
        Self::CorruptedStore(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Checks whether the error is fatal for the operation that raised it.
    ///
    /// Fatal errors must never be swallowed or retried by the engine;
    /// `NotFound` is the only soft lookup outcome.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SseError::NotFound(_))
    }

    /// Returns the error category as a static string for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            SseError::InvalidPassword => "invalid_password",
            SseError::VaultLocked => "vault_locked",
            SseError::AeadFailure(_) => "aead_failure",
            SseError::IndexTampered(_) => "index_tampered",
            SseError::NotFound(_) => "not_found",
            SseError::InvalidParameter(_) => "invalid_parameter",
            SseError::CorruptedStore(_) => "corrupted_store",
            SseError::IoError(_) => "io_error",
            SseError::DatabaseError(_) => "database_error",
            SseError::SerializationError(_) => "serialization_error",
        }
    }
}

impl From<std::io::Error> for SseError {
    fn from(err: std::io::Error) -> Self {
        SseError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SseError {
    fn from(err: serde_json::Error) -> Self {
        SseError::SerializationError(err.to_string())
    }
}
