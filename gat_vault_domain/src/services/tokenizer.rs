// /////////////////////////////////////////////////////////////////////////////
// Gat Vault RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tokenizers
//!
//! Client-side text analysis feeding the encrypted index: word extraction
//! for exact search, character n-grams for substring search, Soundex codes
//! for phonetic candidates, and Levenshtein distance for the fuzzy filter.
//!
//! Everything here runs on plaintext BEFORE encryption (upload) or AFTER
//! decryption (fuzzy verification). Nothing in this module touches key
//! material, and the edit-distance computation in particular is never sent to
//! the server.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static word regex"));

// Soundex digit per letter A..Z.
const SOUNDEX_DIGITS: &[u8; 26] = b"01230120022455012623010202";

/// Length of a Soundex code.
const SOUNDEX_LEN: usize = 4;

/// Extracts normalized keywords from text: `[a-z0-9]+` runs over the
/// lowercased input, first-seen order, deduplicated.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for m in WORD_RE.find_iter(&lowered) {
        if seen.insert(m.as_str().to_string()) {
            words.push(m.as_str().to_string());
        }
    }
    words
}

/// Extracts character n-grams from text, lowercased and trimmed, duplicates
/// preserved (frequency analysis variant).
///
/// Input shorter than `n` yields the whole input; empty input yields nothing.
pub fn extract_ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let normalized: Vec<char> = text.trim().to_lowercase().chars().collect();
    if normalized.is_empty() {
        return Vec::new();
    }
    if normalized.len() < n {
        return vec![normalized.iter().collect()];
    }
    normalized
        .windows(n)
        .map(|w| w.iter().collect())
        .collect()
}

/// Unique n-grams in first-seen order. This is the variant used for index
/// keys and search token sets.
pub fn extract_ngrams_unique(text: &str, n: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for ng in extract_ngrams(text, n) {
        if seen.insert(ng.clone()) {
            out.push(ng);
        }
    }
    out
}

/// Classic 4-character Soundex code: first letter plus up to three digits,
/// consecutive duplicate digits collapsed, zeros dropped, right-padded with
/// `0`.
///
/// Returns an empty string for input that is not purely ASCII-alphabetic.
pub fn soundex(word: &str) -> String {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_alphabetic()) {
        return String::new();
    }
    let upper = word.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let mut code = String::with_capacity(SOUNDEX_LEN);
    code.push(bytes[0] as char);
    for &b in &bytes[1..] {
        let digit = SOUNDEX_DIGITS[(b - b'A') as usize] as char;
        if digit == '0' {
            continue;
        }
        if code.ends_with(digit) {
            continue;
        }
        code.push(digit);
    }
    while code.len() < SOUNDEX_LEN {
        code.push('0');
    }
    code.truncate(SOUNDEX_LEN);
    code
}

/// Soundex codes for every whitespace-separated word in the text, deduplicated
/// in first-seen order. Words with no code (non-alphabetic) are skipped.
pub fn soundex_words(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for word in text.to_lowercase().split_whitespace() {
        let code = soundex(word);
        if code.is_empty() {
            continue;
        }
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    codes
}

/// Levenshtein edit distance between two strings, by characters.
///
/// Two-row dynamic programming; used client-side only after decryption.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (longer, shorter) = if a_chars.len() >= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    let mut prev: Vec<usize> = (0..=shorter.len()).collect();
    for i in 1..=longer.len() {
        let mut curr = Vec::with_capacity(shorter.len() + 1);
        curr.push(i);
        for j in 1..=shorter.len() {
            let cost = usize::from(longer[i - 1] != shorter[j - 1]);
            let best = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            curr.push(best);
        }
        prev = curr;
    }
    prev[shorter.len()]
}
