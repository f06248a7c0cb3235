// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gat Vault Domain
//!
//! Domain layer of the Gat Vault searchable-symmetric-encryption engine:
//! the cryptographic core and its invariants, independent of storage
//! technology, transport, and runtime.
//!
//! ## Module Structure
//!
//! ### Entities
//! Objects with identity and lifecycle:
//! - `VaultManager`: LOCKED/UNLOCKED state machine owning in-memory keys
//! - `VaultRecord`: non-secret persisted vault description
//!
//! ### Value Objects
//! Immutable, self-validating types:
//! - `DocId`: opaque validated document identifier
//! - `SearchToken`: 32-byte PRF output used as query token and index key
//! - `Filename` / `FilenameRecord`: legacy-or-encrypted filename sum type
//! - `VaultMetadata`: per-vault filename records and keyword counter
//!
//! ### Domain Services
//! Stateless, synchronous crypto and text analysis:
//! - `kdf`: scrypt/PBKDF2 password hardening, HKDF subkey schedule
//! - `document_cipher` / `filename_cipher`: AES-256-GCM payloads and records
//! - `trapdoor` / `forward_private`: deterministic and forward-private tokens
//! - `tokenizer`: words, n-grams, Soundex, Levenshtein
//! - `index_mac`: HMAC protection for index blocks and entries
//!
//! ### Repository Ports
//! - `IndexBackend`: async persistence port for `(token_hex, doc_id)` pairs
//!
//! ## Security Invariants
//!
//! - No operation yields plaintext on a failed tag or MAC check
//! - Key material is zeroized on lock, drop, and inactivity expiry
//! - Errors never carry secrets, only lengths and operation context
//! - Token matching is constant-time in byte content

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
pub use entities::{UnlockOutcome, VaultManager, VaultState};
pub use error::SseError;
pub use repositories::IndexBackend;
pub use services::{KdfConfig, ScryptParams, VaultKeyBundle};
pub use value_objects::{DocId, Filename, FilenameRecord, SearchToken, VaultMetadata};
