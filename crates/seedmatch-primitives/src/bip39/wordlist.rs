//! The BIP-39 English word list.
//!
//! 2048 unique lowercase words in ascending order, parsed once into an
//! immutable table. Lookups are exact and case-sensitive.

use std::sync::LazyLock;

/// Number of words in a BIP-39 word list.
pub const WORDLIST_LEN: usize = 2048;

static ENGLISH: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| include_str!("english.txt").lines().collect());

/// All words, ordered by index.
pub fn words() -> &'static [&'static str] {
    &ENGLISH
}

/// The word at `index`, or `None` if `index >= 2048`.
pub fn word(index: u16) -> Option<&'static str> {
    ENGLISH.get(index as usize).copied()
}

/// Index of `word` in the list. The list is sorted, so this is a binary search.
pub fn index_of(word: &str) -> Option<u16> {
    ENGLISH
        .binary_search_by(|entry| (*entry).cmp(word))
        .ok()
        .map(|i| i as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordlist_shape() {
        let list = words();
        assert_eq!(list.len(), WORDLIST_LEN);
        assert!(list.windows(2).all(|w| w[0] < w[1]), "list must be strictly sorted");
        assert!(list
            .iter()
            .all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_known_positions() {
        assert_eq!(word(0), Some("abandon"));
        assert_eq!(word(3), Some("about"));
        assert_eq!(word(2047), Some("zoo"));
        assert_eq!(word(2048), None);
        assert_eq!(index_of("legal"), Some(1019));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(index_of("abandon"), Some(0));
        assert_eq!(index_of("Abandon"), None);
        assert_eq!(index_of("abandon "), None);
        assert_eq!(index_of("aband"), None);
    }
}
