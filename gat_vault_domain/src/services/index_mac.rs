// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Index Protection
//!
//! HMAC-SHA256 integrity for the encrypted index under `k_index_mac`. Two
//! granularities:
//!
//! - **Block MAC**: over a canonical serialization of a whole index block
//!   (entries as a JSON array of `[token_hex, [doc_ids...]]` pairs, sorted by
//!   token, compact separators). Lets a client verify an index snapshot it
//!   receives from the server before trusting any of it.
//! - **Entry MAC**: over `token_hex || "|" || sorted(doc_ids).join(",")`.
//!   Lets a client verify the exact result of a single lookup.
//!
//! Verification is constant-time; a failed check is `SseError::IndexTampered`
//! and the caller must not return partial results.

use ring::hmac;
use std::collections::BTreeMap;

use crate::error::SseError;
use crate::services::trapdoor::constant_time_eq;

/// HMAC-SHA256 output length.
pub const MAC_LEN: usize = 32;

/// Index block type: token hex mapped to its document ids. `BTreeMap` keeps
/// tokens sorted, which the canonical serialization relies on.
pub type IndexBlock = BTreeMap<String, Vec<String>>;

/// Deterministic serialization for signing: sorted `[token, doc_ids]` pairs,
/// compact JSON.
fn serialize_index_block(entries: &IndexBlock) -> Result<Vec<u8>, SseError> {
    let items: Vec<(&String, &Vec<String>)> = entries.iter().collect();
    serde_json::to_vec(&items)
        .map_err(|e| SseError::serialization_error(format!("Index block serialization failed: {}", e)))
}

fn hmac_sign(k_index_mac: &[u8; 32], data: &[u8]) -> [u8; MAC_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, k_index_mac);
    let tag = hmac::sign(&key, data);
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Computes the block MAC over a canonicalized index block.
pub fn sign_index_block(entries: &IndexBlock, k_index_mac: &[u8; 32]) -> Result<[u8; MAC_LEN], SseError> {
    Ok(hmac_sign(k_index_mac, &serialize_index_block(entries)?))
}

/// Constant-time verification of a block MAC.
pub fn verify_index_block(
    entries: &IndexBlock,
    expected_mac: &[u8],
    k_index_mac: &[u8; 32],
) -> Result<bool, SseError> {
    if expected_mac.len() != MAC_LEN {
        return Ok(false);
    }
    let computed = sign_index_block(entries, k_index_mac)?;
    Ok(constant_time_eq(&computed, expected_mac))
}

/// Verifies a block MAC, failing with `IndexTampered` on mismatch.
pub fn ensure_index_block(
    entries: &IndexBlock,
    expected_mac: &[u8],
    k_index_mac: &[u8; 32],
) -> Result<(), SseError> {
    if verify_index_block(entries, expected_mac, k_index_mac)? {
        Ok(())
    } else {
        Err(SseError::index_tampered("Index block MAC mismatch"))
    }
}

/// Per-entry MAC for one lookup result:
/// `HMAC(token_hex || "|" || sorted(doc_ids).join(","))`.
pub fn sign_index_entry(token_hex: &str, doc_ids: &[String], k_index_mac: &[u8; 32]) -> [u8; MAC_LEN] {
    let mut sorted: Vec<&str> = doc_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let data = format!("{}|{}", token_hex, sorted.join(","));
    hmac_sign(k_index_mac, data.as_bytes())
}

/// Constant-time verification of a per-entry MAC.
pub fn verify_index_entry(
    token_hex: &str,
    doc_ids: &[String],
    mac: &[u8],
    k_index_mac: &[u8; 32],
) -> bool {
    if mac.len() != MAC_LEN {
        return false;
    }
    let expected = sign_index_entry(token_hex, doc_ids, k_index_mac);
    constant_time_eq(&expected, mac)
}

/// Verifies a per-entry MAC, failing with `IndexTampered` on mismatch.
pub fn ensure_index_entry(
    token_hex: &str,
    doc_ids: &[String],
    mac: &[u8],
    k_index_mac: &[u8; 32],
) -> Result<(), SseError> {
    if verify_index_entry(token_hex, doc_ids, mac, k_index_mac) {
        Ok(())
    } else {
        Err(SseError::index_tampered(format!(
            "Index entry MAC mismatch for token {}",
            token_hex
        )))
    }
}
