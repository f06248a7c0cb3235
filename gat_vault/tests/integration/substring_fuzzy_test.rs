//! # Substring, Phonetic, and Ranked Search Tests
//!
//! The n-gram intersection mode, Soundex candidates with client-side
//! Levenshtein verification, and TF-IDF ranking over decrypted candidates.

use crate::support::{as_sorted, docs, json_client};
use gat_vault_domain::SseError;
use tempfile::TempDir;

#[tokio::test]
async fn test_substring_trigram_intersection() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents_substring_index(&docs(&[("d", "superconductor")]), 3)
        .await
        .unwrap();

    assert_eq!(client.search_substring("cond", 3, 0).await.unwrap(), vec!["d"]);
    assert_eq!(client.search_substring("SUPER", 3, 0).await.unwrap(), vec!["d"]);
    assert!(client.search_substring("xylo", 3, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_substring_distinguishes_documents() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents_substring_index(
            &docs(&[("d1", "superconductor"), ("d2", "semiconductor")]),
            3,
        )
        .await
        .unwrap();

    // Shared substring hits both; distinctive prefix hits one.
    assert_eq!(
        as_sorted(client.search_substring("conduct", 3, 0).await.unwrap()),
        vec!["d1", "d2"]
    );
    assert_eq!(client.search_substring("supe", 3, 0).await.unwrap(), vec!["d1"]);
}

#[tokio::test]
async fn test_substring_query_shorter_than_n_matches_whole_input_gram() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents_substring_index(&docs(&[("d", "ab")]), 3)
        .await
        .unwrap();

    // "ab" is shorter than n, indexed as itself.
    assert_eq!(client.search_substring("ab", 3, 0).await.unwrap(), vec!["d"]);
    assert!(client.search_substring("", 3, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_substring_rejects_degenerate_n() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    let err = client
        .upload_documents_substring_index(&docs(&[("d", "text")]), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SseError::InvalidParameter(_)));

    let err = client.search_substring("text", 0, 0).await.unwrap_err();
    assert!(matches!(err, SseError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_phonetic_candidates_match_sound_alikes() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    let batch = docs(&[("a", "robert called"), ("b", "rupert replied"), ("c", "receipt")]);
    client.upload_documents(&batch).await.unwrap();
    client.upload_documents_phonetic_index(&batch).await.unwrap();

    // Robert and Rupert share a Soundex code.
    let candidates = as_sorted(client.search_phonetic_candidates("robert").await.unwrap());
    assert_eq!(candidates, vec!["a", "b"]);
}

#[tokio::test]
async fn test_fuzzy_filters_candidates_by_edit_distance() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    let batch = docs(&[("a", "robert called"), ("b", "rupert replied")]);
    client.upload_documents(&batch).await.unwrap();
    client.upload_documents_phonetic_index(&batch).await.unwrap();

    // "robert" -> "rupert" is edit distance 2; distance 1 keeps only the
    // exact document, distance 2 admits both.
    assert_eq!(client.search_fuzzy("robert", 1).await.unwrap(), vec!["a"]);
    assert_eq!(as_sorted(client.search_fuzzy("robert", 2).await.unwrap()), vec!["a", "b"]);
    assert!(client.search_fuzzy("zzzzzz", 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ranked_orders_by_term_frequency() {
    let dir = TempDir::new().unwrap();
    let mut client = json_client(dir.path()).await;

    client
        .upload_documents(&docs(&[
            ("dense", "tax tax tax"),
            ("sparse", "tax and many other unrelated words here"),
            ("none", "completely different"),
        ]))
        .await
        .unwrap();

    let ranked = client.search_ranked("tax", 10, 0).await.unwrap();
    assert_eq!(ranked, vec!["dense", "sparse"]);

    let top_one = client.search_ranked("tax", 1, 0).await.unwrap();
    assert_eq!(top_one, vec!["dense"]);

    assert!(client.search_ranked("absent", 5, 0).await.unwrap().is_empty());
    assert!(client.search_ranked("   ", 5, 0).await.unwrap().is_empty());
}
