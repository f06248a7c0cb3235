// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Client Engine
//!
//! The data owner's side of the protocol. The client holds the vault key
//! bundle, encrypts documents, builds index batches, generates search tokens,
//! and decrypts results. Five search modes share one server and one index:
//!
//! | Mode | Index keys | Server work | Client work |
//! |------|-----------|-------------|-------------|
//! | Exact | trapdoor per keyword | token match | none |
//! | Forward-private | `IK(kw, counter)` | multi-token match | counter bookkeeping |
//! | Substring | trapdoor per n-gram | per-token breakdown | set intersection |
//! | Phonetic/fuzzy | trapdoor per Soundex code | token match | decrypt + edit distance |
//! | Ranked | trapdoor per keyword | token match | decrypt + TF-IDF |
//!
//! ## Upload Batching
//!
//! Each upload call builds a single deduplicated `token_hex -> [doc_id]` map
//! and hands it to the server in one `upload_index` call, minimizing write
//! amplification and making the batch atomic relative to concurrent
//! searches.
//!
//! ## Padding Filter
//!
//! The client remembers the doc_ids it has uploaded (in-memory only). When a
//! padded search response arrives, ids outside the known set are dropped.
//! After a process restart the cache is empty and filtering degrades to a
//! no-op until re-primed from `list_document_ids`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use gat_vault_domain::services::document_cipher::{decrypt_document, encrypt_document};
use gat_vault_domain::services::forward_private::{
    derive_forward_key, forward_index_key, forward_search_tokens,
};
use gat_vault_domain::services::index_mac::{ensure_index_block, sign_index_block, IndexBlock};
use gat_vault_domain::services::tokenizer::{
    extract_keywords, extract_ngrams_unique, levenshtein, soundex_words,
};
use gat_vault_domain::services::trapdoor::{
    build_trapdoor, encrypt_keyword_for_index, normalize_keyword,
};
use gat_vault_domain::value_objects::{DocId, KeywordCounter, SearchToken};
use gat_vault_domain::{SseError, VaultKeyBundle};

use super::storage_server::StorageServer;

/// Data owner / searcher: encrypts, indexes, searches, decrypts.
pub struct SseClient {
    keys: VaultKeyBundle,
    server: Arc<StorageServer>,
    // Filters padding out of padded responses; in-memory only.
    known_doc_ids: HashSet<String>,
}

fn dedupe_batch(batch: &mut BTreeMap<String, Vec<String>>) {
    for doc_ids in batch.values_mut() {
        let mut seen = HashSet::new();
        doc_ids.retain(|d| seen.insert(d.clone()));
    }
}

fn text_of(plaintext: &[u8]) -> String {
    String::from_utf8_lossy(plaintext).into_owned()
}

impl SseClient {
    /// Creates a client over an unlocked vault's key bundle and a server
    /// handle. The bundle is obtained through the vault manager capability
    /// and wipes itself when the client is dropped.
    pub fn new(keys: VaultKeyBundle, server: Arc<StorageServer>) -> Self {
        Self {
            keys,
            server,
            known_doc_ids: HashSet::new(),
        }
    }

    /// Re-primes the padding filter, e.g. from `list_document_ids` after a
    /// restart.
    pub fn prime_known_doc_ids<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.known_doc_ids.extend(ids);
    }

    fn filter_padding(&self, raw: Vec<String>, pad_to: usize) -> Vec<String> {
        if pad_to > 0 && !self.known_doc_ids.is_empty() {
            raw.into_iter()
                .filter(|id| self.known_doc_ids.contains(id))
                .collect()
        } else {
            raw
        }
    }

    // -------------------------------------------------------------------
    // Exact keyword mode
    // -------------------------------------------------------------------

    /// Encrypts documents, uploads them, and builds the deterministic
    /// keyword index in one batch. Returns the uploaded batch
    /// (`token_hex -> [doc_id]`).
    pub async fn upload_documents(
        &mut self,
        documents: &[(DocId, Vec<u8>)],
    ) -> Result<BTreeMap<String, Vec<String>>, SseError> {
        let mut batch: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (doc_id, plaintext) in documents {
            self.known_doc_ids.insert(doc_id.as_str().to_string());
            let blob = encrypt_document(plaintext, &self.keys.k_file_enc)?;
            self.server.upload_document(doc_id, &blob).await?;

            for keyword in extract_keywords(&text_of(plaintext)) {
                let token = encrypt_keyword_for_index(&keyword, &self.keys.k_search);
                batch
                    .entry(token.token_hex())
                    .or_default()
                    .push(doc_id.as_str().to_string());
            }
        }
        dedupe_batch(&mut batch);
        self.server.upload_index(&batch).await?;
        tracing::debug!(documents = documents.len(), tokens = batch.len(), "uploaded keyword batch");
        Ok(batch)
    }

    /// Single-document convenience wrapper over [`upload_documents`].
    pub async fn upload_document(&mut self, doc_id: &DocId, plaintext: &[u8]) -> Result<(), SseError> {
        self.upload_documents(&[(doc_id.clone(), plaintext.to_vec())])
            .await?;
        Ok(())
    }

    /// Exact keyword search. With `pad_to > 0` the server response is padded;
    /// the client filters it against its known-document set.
    pub async fn search(&self, query: &str, pad_to: usize) -> Result<Vec<String>, SseError> {
        let token = build_trapdoor(query, &self.keys.k_search);
        let raw = self.server.search(&token, pad_to).await?;
        Ok(self.filter_padding(raw, pad_to))
    }

    /// Per-keyword result map for a set of keywords.
    pub async fn search_multi_keyword(
        &self,
        keywords: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, SseError> {
        let mut result = BTreeMap::new();
        for keyword in keywords {
            result.insert(keyword.clone(), self.search(keyword, 0).await?);
        }
        Ok(result)
    }

    /// Fetches and decrypts one document.
    ///
    /// # Errors
    ///
    /// `SseError::NotFound` when the server holds no such document;
    /// `SseError::AeadFailure` when the blob fails authentication.
    pub async fn retrieve_and_decrypt(&self, doc_id: &DocId) -> Result<Vec<u8>, SseError> {
        let blob = self
            .server
            .get_document(doc_id)
            .ok_or_else(|| SseError::not_found(format!("Document {}", doc_id)))?;
        decrypt_document(&blob, &self.keys.k_file_enc)
    }

    // -------------------------------------------------------------------
    // Forward-private mode
    // -------------------------------------------------------------------

    /// Uploads documents under forward-private index keys. The per-keyword
    /// counter is advanced in place, one increment per (document, keyword)
    /// occurrence and strictly increasing within a batch; the caller must
    /// persist it for future searches.
    pub async fn upload_documents_forward_secure(
        &mut self,
        counter: &mut KeywordCounter,
        documents: &[(DocId, Vec<u8>)],
    ) -> Result<(), SseError> {
        let k_fwd = derive_forward_key(&self.keys.k_search);
        let mut batch: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (doc_id, plaintext) in documents {
            self.known_doc_ids.insert(doc_id.as_str().to_string());
            let blob = encrypt_document(plaintext, &self.keys.k_file_enc)?;
            self.server.upload_document(doc_id, &blob).await?;

            for keyword in extract_keywords(&text_of(plaintext)) {
                let keyword = normalize_keyword(&keyword);
                let c = counter.get(&keyword).copied().unwrap_or(0);
                let key = forward_index_key(&keyword, c, &k_fwd);
                batch
                    .entry(key.token_hex())
                    .or_default()
                    .push(doc_id.as_str().to_string());
                counter.insert(keyword, c + 1);
            }
        }
        dedupe_batch(&mut batch);
        self.server.upload_index(&batch).await?;
        Ok(())
    }

    /// Forward-private search: sends tokens for every historical counter
    /// value of the keyword. An untracked keyword yields an empty result, not
    /// an error.
    pub async fn search_forward_secure(
        &self,
        counter: &KeywordCounter,
        query: &str,
        pad_to: usize,
    ) -> Result<Vec<String>, SseError> {
        let keyword = normalize_keyword(query);
        let counter_max = counter.get(&keyword).copied().unwrap_or(0);
        if counter_max == 0 {
            return Ok(Vec::new());
        }
        let k_fwd = derive_forward_key(&self.keys.k_search);
        let tokens = forward_search_tokens(&keyword, counter_max, &k_fwd);
        let raw = self.server.search_multi(&tokens, pad_to).await?;
        Ok(self.filter_padding(raw, pad_to))
    }

    // -------------------------------------------------------------------
    // Substring (n-gram) mode
    // -------------------------------------------------------------------

    /// Builds and uploads the n-gram index for substring search.
    ///
    /// # Errors
    ///
    /// `SseError::InvalidParameter` when `n < 2`.
    pub async fn upload_documents_substring_index(
        &mut self,
        documents: &[(DocId, Vec<u8>)],
        n: usize,
    ) -> Result<(), SseError> {
        if n < 2 {
            return Err(SseError::invalid_parameter(format!(
                "n-gram size must be at least 2, got {}",
                n
            )));
        }
        let mut batch: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (doc_id, plaintext) in documents {
            self.known_doc_ids.insert(doc_id.as_str().to_string());
            for ngram in extract_ngrams_unique(&text_of(plaintext), n) {
                let token = encrypt_keyword_for_index(&ngram, &self.keys.k_search);
                batch
                    .entry(token.token_hex())
                    .or_default()
                    .push(doc_id.as_str().to_string());
            }
        }
        dedupe_batch(&mut batch);
        self.server.upload_index(&batch).await
    }

    /// Substring search: the query's n-grams are matched individually and the
    /// result is the intersection of their doc_id sets, ordered by the first
    /// n-gram's matches.
    pub async fn search_substring(
        &self,
        query: &str,
        n: usize,
        pad_to: usize,
    ) -> Result<Vec<String>, SseError> {
        if n < 2 {
            return Err(SseError::invalid_parameter(format!(
                "n-gram size must be at least 2, got {}",
                n
            )));
        }
        let ngrams = extract_ngrams_unique(&normalize_keyword(query), n);
        if ngrams.is_empty() {
            return Ok(Vec::new());
        }
        let tokens: Vec<SearchToken> = ngrams
            .iter()
            .map(|ng| build_trapdoor(ng, &self.keys.k_search))
            .collect();
        let per_token = self.server.search_multi_breakdown(&tokens).await?;

        let mut iter = per_token.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let rest: Vec<HashSet<String>> = iter.map(|ids| ids.into_iter().collect()).collect();
        let result: Vec<String> = first
            .into_iter()
            .filter(|id| rest.iter().all(|set| set.contains(id)))
            .collect();
        Ok(self.filter_padding(result, pad_to))
    }

    // -------------------------------------------------------------------
    // Phonetic / fuzzy mode
    // -------------------------------------------------------------------

    /// Builds and uploads the Soundex index used by the fuzzy mode.
    pub async fn upload_documents_phonetic_index(
        &mut self,
        documents: &[(DocId, Vec<u8>)],
    ) -> Result<(), SseError> {
        let mut batch: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (doc_id, plaintext) in documents {
            self.known_doc_ids.insert(doc_id.as_str().to_string());
            for code in soundex_words(&text_of(plaintext)) {
                let token = encrypt_keyword_for_index(&code, &self.keys.k_search);
                batch
                    .entry(token.token_hex())
                    .or_default()
                    .push(doc_id.as_str().to_string());
            }
        }
        dedupe_batch(&mut batch);
        self.server.upload_index(&batch).await
    }

    /// Returns documents containing a word with the same Soundex code as the
    /// query, without edit-distance verification.
    pub async fn search_phonetic_candidates(&self, query: &str) -> Result<Vec<String>, SseError> {
        let codes = soundex_words(&normalize_keyword(query));
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let tokens: Vec<SearchToken> = codes
            .iter()
            .map(|code| build_trapdoor(code, &self.keys.k_search))
            .collect();
        self.server.search_multi(&tokens, 0).await
    }

    /// Fuzzy search: phonetic candidates verified client-side by Levenshtein
    /// distance over the decrypted text. The edit distance never reaches the
    /// server. Exits early on the first word within range per document.
    pub async fn search_fuzzy(
        &self,
        query: &str,
        max_edit_distance: usize,
    ) -> Result<Vec<String>, SseError> {
        let candidates = self.search_phonetic_candidates(query).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let query_norm = normalize_keyword(query);
        let mut result = Vec::new();
        for candidate in candidates {
            let doc_id = DocId::new(candidate.clone())?;
            let plaintext = match self.retrieve_and_decrypt(&doc_id).await {
                Ok(p) => p,
                Err(SseError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let text = text_of(&plaintext).to_lowercase();
            let mut seen_words = HashSet::new();
            for word in text.split_whitespace() {
                if word.chars().count() < 2 || !seen_words.insert(word) {
                    continue;
                }
                if levenshtein(&query_norm, word) <= max_edit_distance {
                    result.push(candidate);
                    break;
                }
            }
        }
        Ok(result)
    }

    // -------------------------------------------------------------------
    // Ranked mode
    // -------------------------------------------------------------------

    /// Keyword search ranked by TF-IDF computed client-side over decrypted
    /// candidates: `tf = count/len(terms)`, `idf = ln((N+1)/(df+1)) + 1`.
    /// Stable descending sort; ties keep first-seen order. The server never
    /// sees scores or term frequencies.
    pub async fn search_ranked(
        &self,
        query: &str,
        top_k: usize,
        pad_to: usize,
    ) -> Result<Vec<String>, SseError> {
        let keyword = normalize_keyword(query);
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let doc_ids = self.search(&keyword, pad_to).await?;
        if doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let total_docs = self.server.list_document_ids().len().max(1);
        let df = doc_ids.len();
        let idf = (((total_docs + 1) as f64) / ((df + 1) as f64)).ln() + 1.0;

        let mut scores: Vec<(String, f64)> = Vec::with_capacity(doc_ids.len());
        for doc_id in doc_ids {
            let parsed = DocId::new(doc_id.clone())?;
            let plaintext = match self.retrieve_and_decrypt(&parsed).await {
                Ok(p) => p,
                Err(SseError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let text = text_of(&plaintext).to_lowercase();
            let terms: Vec<&str> = text.split_whitespace().collect();
            if terms.is_empty() {
                scores.push((doc_id, 0.0));
                continue;
            }
            let count = terms.iter().filter(|t| **t == keyword).count();
            let tf = count as f64 / terms.len() as f64;
            scores.push((doc_id, tf * idf));
        }

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scores.into_iter().take(top_k).map(|(id, _)| id).collect())
    }

    // -------------------------------------------------------------------
    // Index batch protection
    // -------------------------------------------------------------------

    /// Signs an upload batch under `k_index_mac` so the host can persist the
    /// MAC next to the batch.
    pub fn seal_index_batch(&self, batch: &IndexBlock) -> Result<[u8; 32], SseError> {
        sign_index_block(batch, &self.keys.k_index_mac)
    }

    /// Verifies a batch against its MAC; `SseError::IndexTampered` on
    /// mismatch.
    pub fn verify_index_batch(&self, batch: &IndexBlock, mac: &[u8]) -> Result<(), SseError> {
        ensure_index_block(batch, mac, &self.keys.k_index_mac)
    }

    /// Approximate per-document index footprint, straight from the server.
    pub async fn index_bytes_per_doc(&self) -> Result<HashMap<String, u64>, SseError> {
        self.server.index_bytes_per_doc().await
    }
}
