// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Index Backend Port
//!
//! Persistence abstraction for the encrypted index: a multiset of
//! `(token_hex, doc_id)` pairs. The port is implemented twice in the
//! infrastructure layer (JSON file and SQLite) with an identical contract so
//! either can back a vault.
//!
//! ## Contract
//!
//! - Pairs are unique: re-adding an existing `(token_hex, doc_id)` pair
//!   leaves the state unchanged.
//! - `entries()` yields each token exactly once with its unique,
//!   insertion-ordered doc_ids, tokens ordered by `token_hex`; iteration is
//!   deterministic so tests and MAC verification can rely on it.
//! - `remove_doc_id` purges every pair referencing the id; a token with no
//!   remaining doc_ids disappears entirely.
//! - `add_batch` is atomic with respect to concurrent readers: a search sees
//!   the whole batch or none of it.
//!
//! The port is async because implementations do file or database I/O; the
//! values stored are opaque hex strings and ids, never plaintext or keys.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use crate::error::SseError;

/// Storage port for `(token_hex, doc_id)` index pairs.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Adds or merges doc_ids under a token; duplicates are silently deduped.
    async fn add(&self, token_hex: &str, doc_ids: &[String]) -> Result<(), SseError>;

    /// Adds a whole token->doc_ids batch atomically.
    async fn add_batch(&self, batch: &BTreeMap<String, Vec<String>>) -> Result<(), SseError>;

    /// Returns every `(token_hex, doc_ids)` entry, deterministically ordered
    /// by token.
    async fn entries(&self) -> Result<Vec<(String, Vec<String>)>, SseError>;

    /// Purges every pair referencing `doc_id`, dropping tokens that become
    /// empty.
    async fn remove_doc_id(&self, doc_id: &str) -> Result<(), SseError>;

    /// Approximate on-disk index footprint attributed to each doc_id.
    async fn bytes_per_doc(&self) -> Result<HashMap<String, u64>, SseError>;

    /// Releases resources. Default no-op.
    async fn close(&self) -> Result<(), SseError> {
        Ok(())
    }
}
