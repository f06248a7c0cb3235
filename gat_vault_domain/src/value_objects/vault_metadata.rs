// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Per-Vault Metadata Document
//!
//! Each vault persists one small JSON document next to its ciphertexts:
//! filename records keyed by document id, and the per-keyword counter that
//! drives the forward-private index. Both maps are ordered so serialization
//! is deterministic and diffs stay readable.
//!
//! ## On-Disk Format
//!
//! ```json
//! {
//!   "files": { "doc_id": { "encrypted_filename": "...", "filename_iv": "...", "filename_tag": "..." } },
//!   "keyword_counter": { "keyword": 2 }
//! }
//! ```
//!
//! The counter is the forward-privacy state: it increases by one every time a
//! document containing the keyword is indexed, and is never decremented. It
//! must be persisted across sessions or previously indexed entries become
//! unreachable under the forward-private scheme.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filename::Filename;

/// Per-keyword update counter for the forward-private index.
///
/// Invariant: values only grow; a keyword appears once it has been indexed at
/// least once.
pub type KeywordCounter = BTreeMap<String, u64>;

/// Per-vault metadata document: filename records plus forward-privacy state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultMetadata {
    /// Filename record (or legacy plaintext name) per document id
    #[serde(default)]
    pub files: BTreeMap<String, Filename>,
    /// Forward-private per-keyword counter
    #[serde(default)]
    pub keyword_counter: KeywordCounter,
}

impl VaultMetadata {
    /// Records the filename for a document, replacing any previous entry
    pub fn set_filename(&mut self, doc_id: impl Into<String>, filename: Filename) {
        self.files.insert(doc_id.into(), filename);
    }

    /// Removes the filename entry for a deleted document; returns whether one
    /// existed
    pub fn remove_file(&mut self, doc_id: &str) -> bool {
        self.files.remove(doc_id).is_some()
    }

    /// Looks up the filename record for a document
    pub fn filename(&self, doc_id: &str) -> Option<&Filename> {
        self.files.get(doc_id)
    }
}
