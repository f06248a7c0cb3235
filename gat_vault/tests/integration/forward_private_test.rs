//! # Forward-Private Mode Tests
//!
//! Counter semantics and unlinkability at the counter boundary: a search
//! performed between two uploads of the same keyword must not produce any
//! token that matches the later upload's index key.

use crate::support::{as_sorted, docs, json_client};
use gat_vault_domain::services::forward_private::{
    derive_forward_key, forward_index_key, forward_search_tokens,
};
use gat_vault_domain::value_objects::KeywordCounter;
use tempfile::TempDir;

#[tokio::test]
async fn test_counter_advances_per_upload() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;
    let mut counter = KeywordCounter::new();

    client
        .upload_documents_forward_secure(&mut counter, &docs(&[("a", "foo")]))
        .await
        .unwrap();
    assert_eq!(counter.get("foo"), Some(&1));

    client
        .upload_documents_forward_secure(&mut counter, &docs(&[("b", "foo")]))
        .await
        .unwrap();
    assert_eq!(counter.get("foo"), Some(&2));

    let hits = client.search_forward_secure(&counter, "foo", 0).await.unwrap();
    assert_eq!(as_sorted(hits), vec!["a", "b"]);
}

#[tokio::test]
async fn test_search_between_uploads_sees_only_history() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;
    let mut counter = KeywordCounter::new();

    client
        .upload_documents_forward_secure(&mut counter, &docs(&[("a", "foo")]))
        .await
        .unwrap();

    // Search at counter 1 sees only the first document.
    let hits = client.search_forward_secure(&counter, "foo", 0).await.unwrap();
    assert_eq!(hits, vec!["a"]);

    client
        .upload_documents_forward_secure(&mut counter, &docs(&[("b", "foo")]))
        .await
        .unwrap();

    // The earlier search's token set is disjoint from the key used by the
    // second upload, so that search cannot be linked to the new insertion.
    let k_fwd = derive_forward_key(&crate::support::test_keys().k_search);
    let old_tokens = forward_search_tokens("foo", 1, &k_fwd);
    let second_upload_key = forward_index_key("foo", 1, &k_fwd);
    assert!(!old_tokens.contains(&second_upload_key));

    // A fresh search with the advanced counter reaches both documents.
    let hits = client.search_forward_secure(&counter, "foo", 0).await.unwrap();
    assert_eq!(as_sorted(hits), vec!["a", "b"]);
}

#[tokio::test]
async fn test_token_set_matches_counter_range_exactly() {
    let k_fwd = derive_forward_key(&crate::support::test_keys().k_search);
    let tokens = forward_search_tokens("w", 2, &k_fwd);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], forward_index_key("w", 0, &k_fwd));
    assert_eq!(tokens[1], forward_index_key("w", 1, &k_fwd));
}

#[tokio::test]
async fn test_unknown_keyword_returns_empty_without_error() {
    let dir = TempDir::new().unwrap();
    let client = json_client(dir.path()).await;
    let counter = KeywordCounter::new();

    let hits = client
        .search_forward_secure(&counter, "never-indexed", 0)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_same_keyword_twice_in_one_batch_gets_increasing_counters() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;
    let mut counter = KeywordCounter::new();

    // Both documents contain "dup"; within the batch the counter must advance
    // per occurrence.
    client
        .upload_documents_forward_secure(
            &mut counter,
            &docs(&[("a", "dup one"), ("b", "dup two")]),
        )
        .await
        .unwrap();
    assert_eq!(counter.get("dup"), Some(&2));

    let hits = client.search_forward_secure(&counter, "dup", 0).await.unwrap();
    assert_eq!(as_sorted(hits), vec!["a", "b"]);
}

#[tokio::test]
async fn test_deterministic_and_forward_tokens_do_not_collide() {
    use gat_vault_domain::services::trapdoor::build_trapdoor;
    let keys = crate::support::test_keys();
    let k_fwd = derive_forward_key(&keys.k_search);
    let deterministic = build_trapdoor("foo", &keys.k_search);
    let forward = forward_index_key("foo", 0, &k_fwd);
    assert_ne!(deterministic, forward);
}
