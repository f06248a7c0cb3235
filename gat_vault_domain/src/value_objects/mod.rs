// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects for the vault SSE domain.
//!
//! Immutable, self-validating types without identity: document identifiers,
//! search tokens, filename records, and the per-vault metadata document.

pub mod doc_id;
pub mod filename;
pub mod search_token;
pub mod vault_metadata;

pub use doc_id::DocId;
pub use filename::{Filename, FilenameRecord};
pub use search_token::SearchToken;
pub use vault_metadata::{KeywordCounter, VaultMetadata};
