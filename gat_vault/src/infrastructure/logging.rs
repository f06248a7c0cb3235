// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging Bootstrap
//!
//! One-shot tracing initialization for hosts embedding the engine. Level
//! selection follows the conventional `RUST_LOG` environment variable with an
//! `info` default.
//!
//! The engine itself only emits `tracing` events; it never logs key material,
//! plaintext, or passwords. Hosts with their own subscriber simply skip this
//! helper.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Idempotent; later calls are
/// no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt().with_env_filter(filter).with_target(true).init();
    });
}
