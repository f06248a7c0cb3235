//! # Vault Lifecycle and Registry Tests
//!
//! Unlock/lock flows through the registry, capability access, statistics,
//! and the metadata store.

use std::time::Duration;

use gat_vault::{MetadataStore, VaultRegistry};
use gat_vault_domain::entities::UnlockOutcome;
use gat_vault_domain::services::kdf::{KdfConfig, ScryptParams};
use gat_vault_domain::value_objects::{Filename, FilenameRecord};
use gat_vault_domain::SseError;
use tempfile::TempDir;

fn fast_kdf() -> KdfConfig {
    KdfConfig::Scrypt(ScryptParams { log_n: 4, r: 8, p: 1 })
}

#[tokio::test]
async fn test_unlock_create_then_reopen() {
    let dir = TempDir::new().unwrap();
    let registry = VaultRegistry::new(dir.path(), Some(Duration::from_secs(300)));

    let UnlockOutcome::Created { salt, verifier } = registry
        .unlock("u1", "v1", b"pw", None, None, &fast_kdf())
        .unwrap()
    else {
        panic!("expected Created for a fresh vault");
    };

    registry.lock("u1", "v1");
    let err = registry.client_keys("u1", "v1").unwrap_err();
    assert!(matches!(err, SseError::VaultLocked));

    let outcome = registry
        .unlock("u1", "v1", b"pw", Some(&salt), Some(&verifier), &fast_kdf())
        .unwrap();
    assert_eq!(outcome, UnlockOutcome::Reopened);
    assert!(registry.client_keys("u1", "v1").is_ok());

    registry.lock("u1", "v1");
    let err = registry
        .unlock("u1", "v1", b"wrong", Some(&salt), Some(&verifier), &fast_kdf())
        .unwrap_err();
    assert!(matches!(err, SseError::InvalidPassword));
}

#[tokio::test]
async fn test_with_keys_requires_unlocked_vault() {
    let dir = TempDir::new().unwrap();
    let registry = VaultRegistry::new(dir.path(), None);

    let err = registry.with_keys("u1", "v1", |_| ()).unwrap_err();
    assert!(matches!(err, SseError::VaultLocked));

    registry.unlock("u1", "v1", b"pw", None, None, &fast_kdf()).unwrap();
    registry.with_keys("u1", "v1", |keys| {
        assert_eq!(keys.k_search.len(), 32);
    })
    .unwrap();
}

#[tokio::test]
async fn test_vaults_are_isolated_per_user_and_vault() {
    let dir = TempDir::new().unwrap();
    let registry = VaultRegistry::new(dir.path(), None);

    registry.unlock("u1", "v1", b"pw", None, None, &fast_kdf()).unwrap();
    registry.unlock("u2", "v1", b"pw", None, None, &fast_kdf()).unwrap();

    let k1 = registry.client_keys("u1", "v1").unwrap();
    let k2 = registry.client_keys("u2", "v1").unwrap();
    // Different vaults mint different salts, so subkeys differ.
    assert_ne!(k1.k_search, k2.k_search);

    registry.lock("u1", "v1");
    assert!(registry.client_keys("u1", "v1").is_err());
    assert!(registry.client_keys("u2", "v1").is_ok());

    assert_ne!(
        registry.storage_dir("u1", "v1"),
        registry.storage_dir("u2", "v1")
    );
}

#[tokio::test]
async fn test_inactivity_lock_through_registry() {
    let dir = TempDir::new().unwrap();
    let registry = VaultRegistry::new(dir.path(), Some(Duration::from_millis(10)));

    registry.unlock("u1", "v1", b"pw", None, None, &fast_kdf()).unwrap();
    assert!(!registry.check_inactivity("u1", "v1"));
    std::thread::sleep(Duration::from_millis(20));
    assert!(registry.check_inactivity("u1", "v1"));
    assert!(registry.client_keys("u1", "v1").is_err());
    // Untouched vaults report no transition.
    assert!(!registry.check_inactivity("u9", "v9"));
}

#[tokio::test]
async fn test_stats_reflect_storage_and_state() {
    let dir = TempDir::new().unwrap();
    let registry = VaultRegistry::new(dir.path(), None);
    registry.unlock("u1", "v1", b"pw", None, None, &fast_kdf()).unwrap();

    let storage = registry.storage_dir("u1", "v1");
    std::fs::create_dir_all(storage.join("documents")).unwrap();
    std::fs::write(storage.join("documents").join("a"), vec![0u8; 100]).unwrap();
    std::fs::write(storage.join("documents").join("b"), vec![0u8; 50]).unwrap();
    std::fs::write(storage.join("index.json"), b"{}").unwrap();

    let stats = registry.stats("u1", "v1").unwrap();
    assert_eq!(stats.total_encrypted_files, 2);
    assert_eq!(stats.total_encrypted_size_bytes, 150);
    assert_eq!(stats.index_size_bytes, 2);
    assert_eq!(stats.encryption_algorithm, "AES-256-GCM");
    assert_eq!(stats.kdf_algorithm, "scrypt");
    assert_eq!(stats.vault_state, "UNLOCKED");
    assert!(stats.seconds_since_last_activity.is_some());

    registry.lock("u1", "v1");
    let stats = registry.stats("u1", "v1").unwrap();
    assert_eq!(stats.vault_state, "LOCKED");
    assert!(stats.seconds_since_last_activity.is_none());
}

#[tokio::test]
async fn test_metadata_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = MetadataStore::new(dir.path());

    // Missing file reads as empty metadata.
    let metadata = store.load().unwrap();
    assert!(metadata.files.is_empty());

    store
        .record_filename("doc-1", Filename::Plain("legacy.txt".to_string()))
        .unwrap();
    store
        .record_filename(
            "doc-2",
            Filename::Encrypted(FilenameRecord {
                encrypted_filename: "YQ".to_string(),
                filename_iv: "Yg".to_string(),
                filename_tag: "Yw".to_string(),
            }),
        )
        .unwrap();

    let mut metadata = store.load().unwrap();
    assert_eq!(metadata.files.len(), 2);
    assert!(metadata.filename("doc-2").unwrap().is_encrypted());

    metadata.keyword_counter.insert("foo".to_string(), 2);
    store.save(&metadata).unwrap();
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.keyword_counter.get("foo"), Some(&2));

    assert!(store.forget_document("doc-1").unwrap());
    assert!(!store.forget_document("doc-1").unwrap());
}

#[tokio::test]
async fn test_metadata_store_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("metadata.json"), b"xx{").unwrap();
    let store = MetadataStore::new(dir.path());
    let err = store.load().unwrap_err();
    assert!(matches!(err, SseError::CorruptedStore(_)));
}
