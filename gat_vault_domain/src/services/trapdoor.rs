// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Deterministic Trapdoors
//!
//! A trapdoor is the deterministic PRF of a keyword under the search key:
//! `T(kw) = HMAC-SHA256(K_search, normalize(kw))`. The same function encodes
//! keywords for index storage and generates query tokens, so the server can
//! match a query against index entries by byte equality without ever seeing a
//! keyword.
//!
//! ## Leakage Profile
//!
//! Determinism is the point and also the leak: equal keywords produce equal
//! tokens, so the server learns the search pattern (which queries repeat) and
//! the access pattern (which documents match), but never keyword content.
//! Callers that need unlinkability across updates use the forward-private
//! scheme instead.
//!
//! ## Matching Discipline
//!
//! All server-side token comparison goes through [`constant_time_eq`]:
//! length (public) decides first, byte content is compared without a
//! data-dependent early exit.

use ring::hmac;

use crate::value_objects::SearchToken;

/// Normalizes a keyword for indexing and querying: outer whitespace
/// stripped, lowercased.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Builds the deterministic trapdoor for a keyword.
///
/// Same normalized keyword and key always produce the same 32-byte token;
/// that identity with the index encoding is what makes server-side matching
/// possible.
pub fn build_trapdoor(keyword: &str, k_search: &[u8; 32]) -> SearchToken {
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_search);
    let tag = hmac::sign(&key, normalize_keyword(keyword).as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(tag.as_ref());
    SearchToken::from_bytes(out)
}

/// Encodes a keyword as an index key. Identical to [`build_trapdoor`] by
/// construction; kept as a named operation so call sites state their intent.
pub fn encrypt_keyword_for_index(keyword: &str, k_search: &[u8; 32]) -> SearchToken {
    build_trapdoor(keyword, k_search)
}

/// Timing-safe byte equality.
///
/// Slices of different length compare unequal based on the public length
/// alone; equal-length slices are compared without short-circuiting on the
/// first differing byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}
