//! N-gram shingling for MinHash input.
//!
//! Each feature string contributes itself (lowercased) plus its word
//! 3-grams to the shingle set; features with fewer words than the window
//! contribute their whitespace-normalized text as a single shingle. The raw
//! feature and its n-grams are deliberately both kept: short features enter
//! twice under slightly different normalization and the set deduplicates
//! them.
//!
//! Shingles are reduced to 64-bit FNV-1a hashes. The constants are part of
//! the persisted-signature contract and must not change.

use std::collections::HashSet;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hashes a shingle with FNV-1a over its UTF-8 bytes.
pub fn hash_shingle(shingle: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in shingle.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hashes every shingle in a set.
pub fn hash_shingles(shingles: &HashSet<String>) -> HashSet<u64> {
    shingles.iter().map(|s| hash_shingle(s)).collect()
}

/// Creates word-level n-grams from text.
///
/// The text is lowercased and runs of whitespace collapse to single spaces
/// before windowing. Fewer words than `n` yields the whole normalized text
/// as one shingle; blank text yields nothing.
pub fn word_ngrams(text: &str, n: usize) -> HashSet<String> {
    let mut shingles = HashSet::new();

    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if words.is_empty() {
        return shingles;
    }

    if words.len() < n {
        shingles.insert(words.join(" "));
        return shingles;
    }

    for window in words.windows(n) {
        shingles.insert(window.join(" "));
    }

    shingles
}

/// Expands a feature list into the deduplicated shingle set fed to MinHash.
pub fn shingles_from_features<'a, I>(features: I, n: usize) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut shingles = HashSet::new();

    for feature in features {
        if feature.trim().is_empty() {
            continue;
        }
        shingles.insert(feature.to_lowercase());
        shingles.extend(word_ngrams(feature, n));
    }

    shingles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NGRAM_SIZE;

    #[test]
    fn test_word_ngrams_windows() {
        let shingles = word_ngrams("GET /pets operationId:listPets tag:pets", 3);
        assert!(shingles.contains("get /pets operationid:listpets"));
        assert!(shingles.contains("/pets operationid:listpets tag:pets"));
        assert_eq!(shingles.len(), 2);
    }

    #[test]
    fn test_word_ngrams_short_text() {
        let shingles = word_ngrams("GET /pets", 3);
        assert_eq!(shingles.len(), 1);
        assert!(shingles.contains("get /pets"));
    }

    #[test]
    fn test_word_ngrams_collapses_whitespace() {
        assert_eq!(word_ngrams("GET   /pets", 3), word_ngrams("get /pets", 3));
    }

    #[test]
    fn test_word_ngrams_blank() {
        assert!(word_ngrams("   ", 3).is_empty());
        assert!(word_ngrams("", 3).is_empty());
    }

    #[test]
    fn test_shingles_include_raw_feature() {
        let features = ["GET /pets operationId:listPets tag:pets"];
        let shingles = shingles_from_features(features, NGRAM_SIZE);
        // The lowercased feature itself plus its two 3-gram windows.
        assert!(shingles.contains("get /pets operationid:listpets tag:pets"));
        assert_eq!(shingles.len(), 3);
    }

    #[test]
    fn test_short_feature_deduplicates() {
        // A short feature enters via both rules but normalizes identically.
        let shingles = shingles_from_features(["GET /pets"], NGRAM_SIZE);
        assert_eq!(shingles.len(), 1);
    }

    #[test]
    fn test_empty_features_contribute_nothing() {
        let shingles = shingles_from_features(["", "  "], NGRAM_SIZE);
        assert!(shingles.is_empty());
    }

    #[test]
    fn test_fnv1a_reference_values() {
        // FNV-1a with the standard 64-bit parameters.
        assert_eq!(hash_shingle(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(hash_shingle("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_shingle("get /pets"), hash_shingle("get /pets"));
        assert_ne!(hash_shingle("get /pets"), hash_shingle("get /orders"));
    }

    #[test]
    fn test_hash_shingles_set() {
        let mut shingles = HashSet::new();
        shingles.insert("get /pets".to_string());
        shingles.insert("post /orders".to_string());
        assert_eq!(hash_shingles(&shingles).len(), 2);
    }
}
