// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gat Vault
//!
//! Infrastructure and application layers of the searchable-symmetric-
//! encryption engine. The domain crate holds the crypto core; this crate
//! provides everything around it:
//!
//! - **Infrastructure**: JSON and SQLite index backends behind the domain
//!   `IndexBackend` port, the JSON-to-SQLite migration, environment-driven
//!   configuration, and logging bootstrap.
//! - **Application**: the untrusted storage server, the client engine that
//!   orchestrates the five search modes, the vault registry owned by the
//!   service boundary, and the per-vault metadata store.
//!
//! The layering is strict: primitives -> vault -> index backend -> server ->
//! client. Higher layers depend only downward; the core never sees transport
//! details.

pub mod application;
pub mod infrastructure;

pub use application::services::client_engine::SseClient;
pub use application::services::metadata_store::MetadataStore;
pub use application::services::storage_server::StorageServer;
pub use application::services::vault_registry::{VaultRegistry, VaultStats};
pub use infrastructure::config::EngineConfig;
pub use infrastructure::repositories::json_index_backend::JsonIndexBackend;
pub use infrastructure::repositories::sqlite_index_backend::SqliteIndexBackend;
