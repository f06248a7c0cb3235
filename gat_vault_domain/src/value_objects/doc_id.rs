// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Identifier Value Object
//!
//! This module provides the type-safe document identifier used throughout the
//! SSE engine. A `DocId` is an opaque ASCII string chosen by the uploader; the
//! server treats it as a storage key and never derives meaning from it.
//!
//! ## Validation Rules
//!
//! - **Non-empty**: An identifier must contain at least one character
//! - **Length**: At most 120 bytes, so it remains usable as a filename on
//!   every supported filesystem
//! - **Character Set**: `[A-Za-z0-9._-]` only; safe as a path segment with no
//!   escaping, and covers base64url-encoded encrypted filenames
//!
//! ## Security Considerations
//!
//! The identifier is not secret. Callers that want to hide filenames must
//! upload an encrypted-filename record and use an unlinkable identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SseError;

/// Maximum identifier length in bytes.
const MAX_DOC_ID_LEN: usize = 120;

/// Opaque, validated document identifier.
///
/// Value object with equality by content. Construction validates the
/// character set and length so that every `DocId` in the system is safe to
/// use directly as a storage filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Creates a validated document identifier.
    ///
    /// # Errors
    ///
    /// Returns `SseError::InvalidParameter` when the identifier is empty,
    /// longer than 120 bytes, or contains characters outside `[A-Za-z0-9._-]`.
    pub fn new(id: impl Into<String>) -> Result<Self, SseError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SseError::invalid_parameter("Document id must not be empty"));
        }
        if id.len() > MAX_DOC_ID_LEN {
            return Err(SseError::invalid_parameter(format!(
                "Document id too long: {} bytes (max {})",
                id.len(),
                MAX_DOC_ID_LEN
            )));
        }
        if !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
        {
            return Err(SseError::invalid_parameter(
                "Document id must contain only ASCII alphanumerics, '.', '_', '-'",
            ));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
