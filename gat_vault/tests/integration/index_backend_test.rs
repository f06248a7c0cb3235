//! # Index Backend Contract Tests
//!
//! Both backends must satisfy the same contract: pair uniqueness,
//! deterministic iteration, doc purge, and batch atomicity surface. Plus the
//! one-shot JSON-to-SQLite migration.

use std::collections::BTreeMap;

use gat_vault::infrastructure::repositories::migrate_json_index;
use gat_vault::{JsonIndexBackend, SqliteIndexBackend};
use gat_vault_domain::repositories::IndexBackend;
use gat_vault_domain::SseError;
use tempfile::TempDir;

fn sample_batch() -> BTreeMap<String, Vec<String>> {
    let mut batch = BTreeMap::new();
    batch.insert("aaaa".to_string(), vec!["d1".to_string(), "d2".to_string()]);
    batch.insert("bbbb".to_string(), vec!["d2".to_string()]);
    batch.insert("cccc".to_string(), vec!["d3".to_string(), "d3".to_string()]);
    batch
}

async fn assert_contract(backend: &dyn IndexBackend) {
    backend.add_batch(&sample_batch()).await.unwrap();

    // Duplicate additions leave the state unchanged.
    backend.add("aaaa", &["d1".to_string()]).await.unwrap();
    backend.add_batch(&sample_batch()).await.unwrap();

    let entries = backend.entries().await.unwrap();
    assert_eq!(
        entries,
        vec![
            ("aaaa".to_string(), vec!["d1".to_string(), "d2".to_string()]),
            ("bbbb".to_string(), vec!["d2".to_string()]),
            ("cccc".to_string(), vec!["d3".to_string()]),
        ]
    );

    // Iteration is deterministic.
    assert_eq!(backend.entries().await.unwrap(), entries);

    // Footprint attribution covers exactly the indexed docs.
    let footprint = backend.bytes_per_doc().await.unwrap();
    assert!(footprint.get("d1").copied().unwrap_or(0) > 0);
    assert!(footprint.get("d2").copied().unwrap_or(0) > 0);
    assert!(footprint.get("d3").copied().unwrap_or(0) > 0);

    // Purging a doc removes every pair and drops empty tokens.
    backend.remove_doc_id("d2").await.unwrap();
    let entries = backend.entries().await.unwrap();
    assert_eq!(
        entries,
        vec![
            ("aaaa".to_string(), vec!["d1".to_string()]),
            ("cccc".to_string(), vec!["d3".to_string()]),
        ]
    );
    for (_, doc_ids) in &entries {
        assert!(!doc_ids.contains(&"d2".to_string()));
    }
}

#[tokio::test]
async fn test_json_backend_contract() {
    let dir = TempDir::new().unwrap();
    let backend = JsonIndexBackend::open(dir.path()).unwrap();
    assert_contract(&backend).await;
}

#[tokio::test]
async fn test_sqlite_backend_contract() {
    let backend = SqliteIndexBackend::in_memory().await.unwrap();
    assert_contract(&backend).await;
}

#[tokio::test]
async fn test_json_backend_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let backend = JsonIndexBackend::open(dir.path()).unwrap();
        backend.add_batch(&sample_batch()).await.unwrap();
    }
    let backend = JsonIndexBackend::open(dir.path()).unwrap();
    let entries = backend.entries().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].0, "aaaa");
}

#[tokio::test]
async fn test_corrupt_json_index_fails_loudly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.json"), b"{ not json").unwrap();
    let err = JsonIndexBackend::open(dir.path()).unwrap_err();
    assert!(matches!(err, SseError::CorruptedStore(_)));
}

#[tokio::test]
async fn test_migration_preserves_entries_and_backs_up_json() {
    let dir = TempDir::new().unwrap();
    let expected = {
        let backend = JsonIndexBackend::open(dir.path()).unwrap();
        backend.add_batch(&sample_batch()).await.unwrap();
        backend.entries().await.unwrap()
    };

    assert!(migrate_json_index(dir.path()).await.unwrap());

    let backend = SqliteIndexBackend::open(dir.path()).await.unwrap();
    assert_eq!(backend.entries().await.unwrap(), expected);
    backend.close().await.unwrap();

    assert!(dir.path().join("index.json.bak").exists());
    assert!(!dir.path().join("index.json").exists());
    assert!(dir.path().join("index.db").exists());
}

#[tokio::test]
async fn test_migration_is_a_noop_without_json_or_with_existing_db() {
    let dir = TempDir::new().unwrap();
    // Nothing to migrate.
    assert!(!migrate_json_index(dir.path()).await.unwrap());

    // Existing SQLite index is never overwritten.
    let backend = SqliteIndexBackend::open(dir.path()).await.unwrap();
    backend.close().await.unwrap();
    std::fs::write(dir.path().join("index.json"), b"{}").unwrap();
    assert!(!migrate_json_index(dir.path()).await.unwrap());
    assert!(dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_migration_rejects_corrupt_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.json"), b"[1, 2").unwrap();
    let err = migrate_json_index(dir.path()).await.unwrap_err();
    assert!(matches!(err, SseError::CorruptedStore(_)));
    // The corrupt file is left in place for manual repair.
    assert!(dir.path().join("index.json").exists());
}
