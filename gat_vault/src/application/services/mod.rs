// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services.

pub mod client_engine;
pub mod metadata_store;
pub mod storage_server;
pub mod vault_registry;

pub use client_engine::SseClient;
pub use metadata_store::MetadataStore;
pub use storage_server::StorageServer;
pub use vault_registry::{VaultRegistry, VaultStats};
