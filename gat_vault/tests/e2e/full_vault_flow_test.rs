//! # Full Vault Flow
//!
//! One user's complete session: unlock a fresh vault, upload documents with
//! encrypted filenames, run every search mode, lock, re-unlock, and verify
//! that persisted state (index, metadata, counter) survives while the
//! padding filter degrades gracefully.

use std::sync::Arc;
use std::time::Duration;

use gat_vault::{
    JsonIndexBackend, MetadataStore, SseClient, StorageServer, VaultRegistry,
};
use gat_vault_domain::entities::UnlockOutcome;
use gat_vault_domain::services::filename_cipher::{decrypt_filename, encrypt_filename};
use gat_vault_domain::services::kdf::{KdfConfig, ScryptParams};
use gat_vault_domain::value_objects::{DocId, Filename, KeywordCounter};
use tempfile::TempDir;

fn fast_kdf() -> KdfConfig {
    KdfConfig::Scrypt(ScryptParams { log_n: 4, r: 8, p: 1 })
}

#[tokio::test]
async fn test_full_session_roundtrip() {
    let base = TempDir::new().unwrap();
    let registry = VaultRegistry::new(base.path(), Some(Duration::from_secs(300)));

    // Create and unlock a fresh vault.
    let UnlockOutcome::Created { salt, verifier } = registry
        .unlock("alice", "personal", b"correct horse", None, None, &fast_kdf())
        .unwrap()
    else {
        panic!("fresh vault must mint a salt");
    };

    let storage = registry.storage_dir("alice", "personal");
    let keys = registry.client_keys("alice", "personal").unwrap();
    let server = Arc::new(
        StorageServer::open(&storage, Box::new(JsonIndexBackend::open(&storage).unwrap()))
            .await
            .unwrap(),
    );
    let mut client = SseClient::new(keys.clone(), server.clone());
    let metadata_store = MetadataStore::new(&storage);

    // Upload two documents; record encrypted filenames in vault metadata.
    let doc_a = DocId::new("doc-a").unwrap();
    let doc_b = DocId::new("doc-b").unwrap();
    client
        .upload_documents(&[
            (doc_a.clone(), b"invoice for consulting services".to_vec()),
            (doc_b.clone(), b"meeting notes and invoice draft".to_vec()),
        ])
        .await
        .unwrap();

    for (doc_id, name) in [(&doc_a, "Invoice-Q3.pdf"), (&doc_b, "Notes 2024.md")] {
        let record = encrypt_filename(name, &keys.k_filename_enc).unwrap();
        metadata_store
            .record_filename(doc_id.as_str(), Filename::Encrypted(record))
            .unwrap();
    }

    // Forward-private upload with persisted counter.
    let mut counter = KeywordCounter::new();
    client
        .upload_documents_forward_secure(
            &mut counter,
            &[(DocId::new("doc-c").unwrap(), b"confidential forecast".to_vec())],
        )
        .await
        .unwrap();
    let mut metadata = metadata_store.load().unwrap();
    metadata.keyword_counter = counter.clone();
    metadata_store.save(&metadata).unwrap();

    // Every mode answers from the same vault.
    let mut exact = client.search("invoice", 0).await.unwrap();
    exact.sort();
    assert_eq!(exact, vec!["doc-a", "doc-b"]);
    assert_eq!(
        client.search_forward_secure(&counter, "forecast", 0).await.unwrap(),
        vec!["doc-c"]
    );
    let plain = client.retrieve_and_decrypt(&doc_a).await.unwrap();
    assert_eq!(plain, b"invoice for consulting services");

    // Filenames decrypt back through vault metadata.
    let metadata = metadata_store.load().unwrap();
    let Filename::Encrypted(record) = metadata.filename("doc-a").unwrap() else {
        panic!("expected an encrypted filename record");
    };
    assert_eq!(decrypt_filename(record, &keys.k_filename_enc).unwrap(), "Invoice-Q3.pdf");

    // Lock, then re-unlock with the persisted salt and verifier.
    registry.lock("alice", "personal");
    assert!(registry.client_keys("alice", "personal").is_err());
    registry
        .unlock(
            "alice",
            "personal",
            b"correct horse",
            Some(&salt),
            Some(&verifier),
            &fast_kdf(),
        )
        .unwrap();
    let keys_again = registry.client_keys("alice", "personal").unwrap();

    // A fresh client (restart) still searches the persisted index; the
    // padding filter is empty until re-primed, after which padded responses
    // collapse back to real hits.
    let server = Arc::new(
        StorageServer::open(&storage, Box::new(JsonIndexBackend::open(&storage).unwrap()))
            .await
            .unwrap(),
    );
    let mut fresh_client = SseClient::new(keys_again, server.clone());
    let mut exact = fresh_client.search("invoice", 0).await.unwrap();
    exact.sort();
    assert_eq!(exact, vec!["doc-a", "doc-b"]);

    let padded_unfiltered = fresh_client.search("invoice", 8).await.unwrap();
    assert_eq!(padded_unfiltered.len(), 8);
    fresh_client.prime_known_doc_ids(server.list_document_ids());
    let mut padded_filtered = fresh_client.search("invoice", 8).await.unwrap();
    padded_filtered.sort();
    assert_eq!(padded_filtered, vec!["doc-a", "doc-b"]);

    // Counter survives via metadata and keeps forward-private search working.
    let metadata = metadata_store.load().unwrap();
    assert_eq!(
        fresh_client
            .search_forward_secure(&metadata.keyword_counter, "forecast", 0)
            .await
            .unwrap(),
        vec!["doc-c"]
    );
}
