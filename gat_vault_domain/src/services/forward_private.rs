// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Forward-Private Index Keys
//!
//! Forward privacy bounds what a past search token reveals about future
//! uploads. Every keyword carries a per-vault update counter; the index key
//! for the c-th insertion is
//!
//! ```text
//! K_fwd = HMAC-SHA256(K_search, "sse.v1.forward")
//! IK(kw, c) = HMAC-SHA256(K_fwd, kw || be_u64(c))
//! ```
//!
//! Upload stores under `IK(kw, counter)` and increments the counter. Search
//! sends the full historical token set `{IK(kw, 0) .. IK(kw, c-1)}`, so old
//! entries stay findable while an insertion after the search uses a key the
//! server has never seen and cannot link to the earlier query.
//!
//! The scheme follows Bost-style forward-secure SSE: leakage at update time
//! is limited to "some keyword was updated".

use ring::hmac;

use crate::services::trapdoor::normalize_keyword;
use crate::value_objects::SearchToken;

const LABEL_FWD: &[u8] = b"sse.v1.forward";

/// Derives the forward-privacy key from the search subkey. Computed once per
/// client session; separate domain from deterministic trapdoors.
pub fn derive_forward_key(k_search: &[u8; 32]) -> [u8; 32] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_search);
    let tag = hmac::sign(&key, LABEL_FWD);
    let mut out = [0u8; 32];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Index key for `(keyword, counter)`. Same pair always yields the same key;
/// any other counter yields an unlinkable one.
pub fn forward_index_key(keyword: &str, counter: u64, k_fwd: &[u8; 32]) -> SearchToken {
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_fwd);
    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(normalize_keyword(keyword).as_bytes());
    ctx.update(&counter.to_be_bytes());
    let tag = ctx.sign();
    let mut out = [0u8; 32];
    out.copy_from_slice(tag.as_ref());
    SearchToken::from_bytes(out)
}

/// Search tokens for all historical versions of a keyword: counters
/// `0..counter_max` (exclusive). Empty when the keyword was never indexed.
pub fn forward_search_tokens(keyword: &str, counter_max: u64, k_fwd: &[u8; 32]) -> Vec<SearchToken> {
    (0..counter_max)
        .map(|c| forward_index_key(keyword, c, k_fwd))
        .collect()
}
