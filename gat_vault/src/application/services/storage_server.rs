// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Storage Server
//!
//! The untrusted side of the protocol: holds encrypted documents and the
//! encrypted index, answers search tokens. Everything it stores and compares
//! is an opaque byte string; it never sees plaintext, keywords, or keys.
//!
//! ## State and Concurrency
//!
//! Per-vault state is the storage root, an `IndexBackend`, and an in-memory
//! map of document blobs mirrored to `documents/<doc_id>` on disk. All
//! mutations (document upload, index batch, delete) are serialized by one
//! async mutex held only for the duration of the write; searches and document
//! reads proceed concurrently. A search therefore observes an upload batch
//! entirely or not at all.
//!
//! ## Matching and Padding
//!
//! `search_multi` scans every index entry and compares the stored key bytes
//! against each query token with a timing-safe equality, collecting matched
//! doc_ids in first-seen order. When `pad_to` exceeds the real result count
//! the response is padded with random hex ids guaranteed not to collide with
//! any stored document, then uniformly shuffled so position reveals nothing.

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tokio::sync::Mutex;

use gat_vault_domain::repositories::IndexBackend;
use gat_vault_domain::value_objects::{DocId, SearchToken};
use gat_vault_domain::SseError;

/// Subdirectory holding one ciphertext blob per document.
const DOCUMENTS_DIR: &str = "documents";

/// Untrusted per-vault storage server.
pub struct StorageServer {
    storage_dir: PathBuf,
    backend: Box<dyn IndexBackend>,
    documents: RwLock<HashMap<String, Vec<u8>>>,
    // Serializes all mutating operations for this vault.
    write_gate: Mutex<()>,
}

impl StorageServer {
    /// Opens the server over a storage directory and index backend, loading
    /// any documents already on disk.
    pub async fn open(storage_dir: impl Into<PathBuf>, backend: Box<dyn IndexBackend>) -> Result<Self, SseError> {
        let storage_dir = storage_dir.into();
        let docs_dir = storage_dir.join(DOCUMENTS_DIR);
        tokio::fs::create_dir_all(&docs_dir).await?;

        let mut documents = HashMap::new();
        let mut dir = tokio::fs::read_dir(&docs_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let blob = tokio::fs::read(entry.path()).await?;
            documents.insert(name, blob);
        }
        tracing::debug!(dir = %storage_dir.display(), documents = documents.len(), "opened storage server");

        Ok(Self {
            storage_dir,
            backend,
            documents: RwLock::new(documents),
            write_gate: Mutex::new(()),
        })
    }

    fn docs_path(&self) -> PathBuf {
        self.storage_dir.join(DOCUMENTS_DIR)
    }

    /// Stores one encrypted document blob.
    pub async fn upload_document(&self, doc_id: &DocId, ciphertext: &[u8]) -> Result<(), SseError> {
        let _guard = self.write_gate.lock().await;
        let path = self.docs_path().join(doc_id.as_str());
        tokio::fs::write(&path, ciphertext).await?;
        self.documents
            .write()
            .insert(doc_id.as_str().to_string(), ciphertext.to_vec());
        Ok(())
    }

    /// Accepts an encrypted index batch from the client:
    /// `token_hex -> [doc_id, ...]`.
    pub async fn upload_index(&self, batch: &BTreeMap<String, Vec<String>>) -> Result<(), SseError> {
        let _guard = self.write_gate.lock().await;
        self.backend.add_batch(batch).await
    }

    /// Single-token search; equivalent to `search_multi` with one token.
    pub async fn search(&self, token: &SearchToken, pad_to: usize) -> Result<Vec<String>, SseError> {
        self.search_multi(std::slice::from_ref(token), pad_to).await
    }

    /// Returns the union of doc_ids for index entries matching any query
    /// token, in first-seen order, optionally padded to a fixed size.
    pub async fn search_multi(&self, tokens: &[SearchToken], pad_to: usize) -> Result<Vec<String>, SseError> {
        let mut result: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (stored_hex, doc_ids) in self.backend.entries().await? {
            let Ok(stored) = hex::decode(&stored_hex) else {
                tracing::debug!(token = %stored_hex, "skipping non-hex index key");
                continue;
            };
            for token in tokens {
                if token.ct_eq(&stored) {
                    for doc_id in &doc_ids {
                        if seen.insert(doc_id.clone()) {
                            result.push(doc_id.clone());
                        }
                    }
                    break;
                }
            }
        }

        if pad_to > result.len() {
            self.pad_and_shuffle(&mut result, pad_to);
        }
        Ok(result)
    }

    /// Per-token search: `result[i]` holds the doc_ids matching `tokens[i]`.
    /// Used for n-gram intersection.
    pub async fn search_multi_breakdown(&self, tokens: &[SearchToken]) -> Result<Vec<Vec<String>>, SseError> {
        let mut result: Vec<Vec<String>> = vec![Vec::new(); tokens.len()];

        for (stored_hex, doc_ids) in self.backend.entries().await? {
            let Ok(stored) = hex::decode(&stored_hex) else {
                continue;
            };
            for (i, token) in tokens.iter().enumerate() {
                if token.ct_eq(&stored) {
                    for doc_id in &doc_ids {
                        if !result[i].contains(doc_id) {
                            result[i].push(doc_id.clone());
                        }
                    }
                    break;
                }
            }
        }
        Ok(result)
    }

    fn pad_and_shuffle(&self, result: &mut Vec<String>, pad_to: usize) {
        let documents = self.documents.read();
        let mut rng = rand::rng();
        while result.len() < pad_to {
            let mut raw = [0u8; 16];
            rng.fill(&mut raw);
            let dummy = hex::encode(raw);
            // Dummies must be distinguishable from every real id so the
            // client can filter them against its known set.
            if documents.contains_key(&dummy) || result.contains(&dummy) {
                continue;
            }
            result.push(dummy);
        }
        result.shuffle(&mut rng);
    }

    /// Fetches one encrypted document blob.
    pub fn get_document(&self, doc_id: &DocId) -> Option<Vec<u8>> {
        self.documents.read().get(doc_id.as_str()).cloned()
    }

    /// Removes a document and every index pair referencing it. Returns
    /// whether the document existed.
    pub async fn delete_document(&self, doc_id: &DocId) -> Result<bool, SseError> {
        let _guard = self.write_gate.lock().await;
        if self.documents.write().remove(doc_id.as_str()).is_none() {
            return Ok(false);
        }
        let path = self.docs_path().join(doc_id.as_str());
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.backend.remove_doc_id(doc_id.as_str()).await?;
        tracing::debug!(doc_id = %doc_id, "deleted document and index pairs");
        Ok(true)
    }

    /// Lists all stored document ids (housekeeping; order unspecified).
    pub fn list_document_ids(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }

    /// Approximate index footprint per document id.
    pub async fn index_bytes_per_doc(&self) -> Result<HashMap<String, u64>, SseError> {
        self.backend.bytes_per_doc().await
    }

    /// Releases backend resources.
    pub async fn close(&self) -> Result<(), SseError> {
        self.backend.close().await
    }
}
