// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Search Token Value Object
//!
//! A `SearchToken` is the 32-byte output of a PRF over a keyword: either the
//! deterministic trapdoor `HMAC-SHA256(K_search, keyword)` or a
//! forward-private index key `HMAC(K_fwd, keyword || counter)`. The same type
//! serves as both the client-side query token and the server-side index key,
//! which is exactly the property that makes encrypted matching possible.
//!
//! Tokens are not secret once sent to the server (the server matches on
//! them), but they reveal nothing about the keyword without `K_search`.

use std::fmt;

use crate::error::SseError;
use crate::services::trapdoor::constant_time_eq;

/// PRF output length: HMAC-SHA256.
pub const TOKEN_LEN: usize = 32;

/// 32-byte search token / index key.
///
/// Equality on tokens that reach matching code paths must go through
/// [`SearchToken::ct_eq`]; the derived `PartialEq` exists for collections and
/// tests only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchToken([u8; TOKEN_LEN]);

impl SearchToken {
    /// Wraps a raw 32-byte PRF output
    pub fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a token from lowercase or uppercase hex.
    ///
    /// # Errors
    ///
    /// Returns `SseError::InvalidParameter` on malformed hex or wrong length.
    pub fn from_hex(token_hex: &str) -> Result<Self, SseError> {
        let raw = hex::decode(token_hex)
            .map_err(|e| SseError::invalid_parameter(format!("Invalid token hex: {}", e)))?;
        let bytes: [u8; TOKEN_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            SseError::invalid_parameter(format!(
                "Token must be {} bytes, got {}",
                TOKEN_LEN,
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Returns the token bytes
    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }

    /// Lowercase hex rendering used as the index key on the wire and on disk
    pub fn token_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Timing-safe comparison against an arbitrary byte string.
    ///
    /// Length mismatch is decided on the public length alone; byte content is
    /// compared without data-dependent early exit.
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        constant_time_eq(&self.0, other)
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token_hex())
    }
}
