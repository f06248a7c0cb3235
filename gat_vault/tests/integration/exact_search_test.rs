//! # Exact Keyword Search Tests
//!
//! End-to-end coverage of the deterministic SSE mode: upload, search, padded
//! responses, deletion, idempotent re-upload, and tamper detection.

use crate::support::{as_sorted, doc, docs, json_client, json_server, sqlite_server, test_keys};
use gat_vault::SseClient;
use gat_vault_domain::services::trapdoor::build_trapdoor;
use gat_vault_domain::SseError;
use tempfile::TempDir;

#[tokio::test]
async fn test_single_document_exact_search() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents(&docs(&[("a", "Alpha beta gamma")]))
        .await
        .unwrap();

    assert_eq!(client.search("beta", 0).await.unwrap(), vec!["a"]);
    assert_eq!(client.search("Beta ", 0).await.unwrap(), vec!["a"]);
    assert!(client.search("delta", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_multi_document_union() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents(&docs(&[
            ("a", "invoice 2024"),
            ("b", "invoice paid"),
            ("c", "receipt"),
        ]))
        .await
        .unwrap();

    let hits = as_sorted(client.search("invoice", 0).await.unwrap());
    assert_eq!(hits, vec!["a", "b"]);
    assert_eq!(client.search("receipt", 0).await.unwrap(), vec!["c"]);
}

#[tokio::test]
async fn test_search_works_over_sqlite_backend_too() {
    let dir = TempDir::new().unwrap();
    let server = sqlite_server(dir.path()).await;
    let mut client = SseClient::new(test_keys(), server);

    client
        .upload_documents(&docs(&[("a", "invoice 2024"), ("b", "invoice paid")]))
        .await
        .unwrap();

    assert_eq!(as_sorted(client.search("invoice", 0).await.unwrap()), vec!["a", "b"]);
}

#[tokio::test]
async fn test_roundtrip_retrieval() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents(&docs(&[("a", "the quick brown fox")]))
        .await
        .unwrap();

    let plain = client.retrieve_and_decrypt(&doc("a")).await.unwrap();
    assert_eq!(plain, b"the quick brown fox");

    let err = client.retrieve_and_decrypt(&doc("missing")).await.unwrap_err();
    assert!(matches!(err, SseError::NotFound(_)));
}

#[tokio::test]
async fn test_reupload_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;
    let batch = docs(&[("a", "alpha beta")]);

    client.upload_documents(&batch).await.unwrap();
    client.upload_documents(&batch).await.unwrap();

    assert_eq!(client.search("alpha", 0).await.unwrap(), vec!["a"]);
    // The index holds each (token, doc) pair once.
    let server = json_server(dir.path()).await;
    let token = build_trapdoor("alpha", &test_keys().k_search);
    assert_eq!(server.search(&token, 0).await.unwrap(), vec!["a"]);
}

#[tokio::test]
async fn test_delete_purges_document_and_index() {
    let dir = TempDir::new().unwrap();
    let server = json_server(dir.path()).await;
    let mut client = SseClient::new(test_keys(), server.clone());

    client
        .upload_documents(&docs(&[("a", "shared term"), ("b", "shared other")]))
        .await
        .unwrap();

    assert!(server.delete_document(&doc("a")).await.unwrap());
    assert!(!server.delete_document(&doc("a")).await.unwrap());

    assert_eq!(client.search("shared", 0).await.unwrap(), vec!["b"]);
    assert!(server.get_document(&doc("a")).is_none());
    assert!(!server.list_document_ids().contains(&"a".to_string()));

    let err = client.retrieve_and_decrypt(&doc("a")).await.unwrap_err();
    assert!(matches!(err, SseError::NotFound(_)));
}

#[tokio::test]
async fn test_padded_search_shape_and_client_filter() {
    let dir = TempDir::new().unwrap();
    let server = json_server(dir.path()).await;
    let mut client = SseClient::new(test_keys(), server.clone());

    client
        .upload_documents(&docs(&[
            ("a", "invoice 2024"),
            ("b", "invoice paid"),
            ("c", "receipt"),
        ]))
        .await
        .unwrap();

    // Raw server view: padded to exactly pad_to, real hits included, dummies
    // disjoint from stored documents.
    let token = build_trapdoor("invoice", &test_keys().k_search);
    let raw = server.search(&token, 10).await.unwrap();
    assert_eq!(raw.len(), 10);
    let real: Vec<String> = raw.iter().filter(|id| ["a", "b"].contains(&id.as_str())).cloned().collect();
    assert_eq!(as_sorted(real), vec!["a", "b"]);
    let stored = server.list_document_ids();
    for id in &raw {
        if id != "a" && id != "b" {
            assert!(!stored.contains(id), "dummy {} collides with a stored doc", id);
        }
    }

    // Client view: padding filtered against the known-document set.
    let filtered = client.search("invoice", 10).await.unwrap();
    assert_eq!(as_sorted(filtered), vec!["a", "b"]);
}

#[tokio::test]
async fn test_tampered_document_fails_closed_but_stays_listed() {
    let dir = TempDir::new().unwrap();
    {
        let mut client = json_client(dir.path()).await;
        client
            .upload_documents(&docs(&[("a", "sensitive contents")]))
            .await
            .unwrap();
    }

    // Flip the last byte of the stored blob (inside the GCM tag).
    let doc_path = dir.path().join("documents").join("a");
    let mut blob = std::fs::read(&doc_path).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0xFF;
    std::fs::write(&doc_path, &blob).unwrap();

    // Reopen so the server serves the tampered bytes.
    let server = json_server(dir.path()).await;
    let client = SseClient::new(test_keys(), server.clone());

    let err = client.retrieve_and_decrypt(&doc("a")).await.unwrap_err();
    assert!(matches!(err, SseError::AeadFailure(_)));
    assert!(server.list_document_ids().contains(&"a".to_string()));
}

#[tokio::test]
async fn test_upload_batch_can_be_sealed_and_verified() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    let batch = client
        .upload_documents(&docs(&[("a", "alpha beta"), ("b", "beta gamma")]))
        .await
        .unwrap();

    let mac = client.seal_index_batch(&batch).unwrap();
    client.verify_index_batch(&batch, &mac).unwrap();

    let mut tampered = batch.clone();
    if let Some((_, ids)) = tampered.iter_mut().next() {
        ids.push("evil".to_string());
    }
    let err = client.verify_index_batch(&tampered, &mac).unwrap_err();
    assert!(matches!(err, SseError::IndexTampered(_)));
}
