// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engine Configuration
//!
//! Environment-driven configuration for the SSE engine. Recognized options:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `GAT_SCRYPT_N` | 8192 | scrypt cost factor (power of two; 32768+ in production) |
//! | `GAT_MAX_UPLOAD_BYTES` | 5 MiB | upload size cap |
//! | `GAT_ALLOWED_EXTENSIONS` | `.txt,.md,.csv,.pdf` | comma-separated allowed extensions |
//! | `GAT_MAX_SEARCH_QUERY_LENGTH` | 500 | query length guard |
//! | `GAT_MAX_KEYWORDS_MULTI` | 20 | multi-keyword query guard |
//! | `GAT_RATE_LIMIT_UPLOAD` | 30 | uploads per user per window |
//! | `GAT_RATE_LIMIT_SEARCH` | 60 | searches per user per window |
//!
//! The rate window is fixed at 60 s and the vault inactivity timeout (300 s
//! default) is constructor-level rather than environment-driven.
//!
//! The core itself accepts arbitrary byte inputs; the upload/search guards
//! parsed here are exposed for the host service layer to enforce at its
//! boundary. Malformed values fail fast with `InvalidParameter` instead of
//! being silently replaced.

use std::collections::BTreeSet;
use std::time::Duration;

use gat_vault_domain::services::kdf::ScryptParams;
use gat_vault_domain::SseError;

const DEFAULT_SCRYPT_N: u64 = 8192;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = ".txt,.md,.csv,.pdf";
const DEFAULT_MAX_SEARCH_QUERY_LENGTH: usize = 500;
const DEFAULT_MAX_KEYWORDS_MULTI: usize = 20;
const DEFAULT_RATE_LIMIT_UPLOAD: u32 = 30;
const DEFAULT_RATE_LIMIT_SEARCH: u32 = 60;

/// Fixed rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Default vault inactivity timeout.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);

/// Parsed engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// scrypt parameters derived from `GAT_SCRYPT_N`
    pub scrypt: ScryptParams,
    /// Upload size cap in bytes
    pub max_upload_bytes: u64,
    /// Allowed upload extensions, lowercased with leading dot
    pub allowed_extensions: BTreeSet<String>,
    /// Maximum search query length in characters
    pub max_search_query_length: usize,
    /// Maximum keyword count for multi-keyword queries
    pub max_keywords_multi: usize,
    /// Upload requests per user per window
    pub rate_limit_upload: u32,
    /// Search requests per user per window
    pub rate_limit_search: u32,
    /// Vault inactivity timeout before auto-lock
    pub inactivity_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scrypt: ScryptParams::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: parse_extensions(DEFAULT_ALLOWED_EXTENSIONS),
            max_search_query_length: DEFAULT_MAX_SEARCH_QUERY_LENGTH,
            max_keywords_multi: DEFAULT_MAX_KEYWORDS_MULTI,
            rate_limit_upload: DEFAULT_RATE_LIMIT_UPLOAD,
            rate_limit_search: DEFAULT_RATE_LIMIT_SEARCH,
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
        }
    }
}

fn parse_extensions(raw: &str) -> BTreeSet<String> {
    raw.to_lowercase()
        .split(',')
        .map(|p| p.trim().replace(' ', ""))
        .filter(|p| !p.is_empty())
        .map(|p| if p.starts_with('.') { p } else { format!(".{}", p) })
        .collect()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, SseError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SseError::invalid_parameter(format!("{} has a malformed value: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Reads configuration from the environment, applying defaults for
    /// missing variables.
    ///
    /// # Errors
    ///
    /// Returns `SseError::InvalidParameter` for malformed numeric values or a
    /// non-power-of-two scrypt cost.
    pub fn from_env() -> Result<Self, SseError> {
        let mut config = Self::default();

        if let Some(n) = env_parse::<u64>("GAT_SCRYPT_N")? {
            config.scrypt = ScryptParams::from_cost(n, 8, 1)?;
        }
        if let Some(v) = env_parse::<u64>("GAT_MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = v;
        }
        if let Ok(raw) = std::env::var("GAT_ALLOWED_EXTENSIONS") {
            config.allowed_extensions = parse_extensions(&raw);
        }
        if let Some(v) = env_parse::<usize>("GAT_MAX_SEARCH_QUERY_LENGTH")? {
            config.max_search_query_length = v;
        }
        if let Some(v) = env_parse::<usize>("GAT_MAX_KEYWORDS_MULTI")? {
            config.max_keywords_multi = v;
        }
        if let Some(v) = env_parse::<u32>("GAT_RATE_LIMIT_UPLOAD")? {
            config.rate_limit_upload = v;
        }
        if let Some(v) = env_parse::<u32>("GAT_RATE_LIMIT_SEARCH")? {
            config.rate_limit_search = v;
        }

        Ok(config)
    }

    /// Checks whether a filename's extension is allowed for upload.
    pub fn extension_allowed(&self, filename: &str) -> bool {
        let lowered = filename.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| lowered.ends_with(ext.as_str()))
    }
}
