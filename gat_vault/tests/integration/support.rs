//! Shared helpers for integration tests: deterministic keys, servers over
//! both backends, and document fixtures.

use std::path::Path;
use std::sync::Arc;

use gat_vault::{JsonIndexBackend, SqliteIndexBackend, SseClient, StorageServer};
use gat_vault_domain::services::kdf::derive_vault_keys;
use gat_vault_domain::value_objects::DocId;
use gat_vault_domain::VaultKeyBundle;

/// Deterministic key bundle so trapdoors are reproducible across test runs.
pub fn test_keys() -> VaultKeyBundle {
    derive_vault_keys(&[7u8; 32]).unwrap()
}

pub async fn json_server(dir: &Path) -> Arc<StorageServer> {
    let backend = JsonIndexBackend::open(dir).unwrap();
    Arc::new(StorageServer::open(dir, Box::new(backend)).await.unwrap())
}

pub async fn sqlite_server(dir: &Path) -> Arc<StorageServer> {
    let backend = SqliteIndexBackend::open(dir).await.unwrap();
    Arc::new(StorageServer::open(dir, Box::new(backend)).await.unwrap())
}

pub async fn json_client(dir: &Path) -> SseClient {
    SseClient::new(test_keys(), json_server(dir).await)
}

pub fn doc(id: &str) -> DocId {
    DocId::new(id).unwrap()
}

pub fn docs(pairs: &[(&str, &str)]) -> Vec<(DocId, Vec<u8>)> {
    pairs
        .iter()
        .map(|(id, text)| (doc(id), text.as_bytes().to_vec()))
        .collect()
}

pub fn as_sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}
