use crate::types::{SENTENCE_END, SENTENCE_START, UNKNOWN_WORD, UNKNOWN_WORD_INDEX, WordIndex};
use std::collections::HashMap;

/// Bidirectional word ↔ index map for one language side
///
/// Index 0 is always the unknown word.
#[derive(Debug, Clone)]
pub struct WordMap {
    indexes: HashMap<String, WordIndex>,
    words: Vec<String>,
}

impl WordMap {
    pub fn new() -> Self {
        let mut map = WordMap {
            indexes: HashMap::new(),
            words: Vec::new(),
        };
        map.intern(UNKNOWN_WORD);
        map
    }

    /// Return the index of `word`, adding it if it is new
    pub fn intern(&mut self, word: &str) -> WordIndex {
        if let Some(&index) = self.indexes.get(word) {
            return index;
        }
        let index = self.words.len() as WordIndex;
        self.words.push(word.to_owned());
        self.indexes.insert(word.to_owned(), index);
        index
    }

    /// Index of `word`, or the unknown-word index
    pub fn index_of(&self, word: &str) -> WordIndex {
        self.indexes
            .get(word)
            .copied()
            .unwrap_or(UNKNOWN_WORD_INDEX)
    }

    pub fn get(&self, word: &str) -> Option<WordIndex> {
        self.indexes.get(word).copied()
    }

    pub fn word(&self, index: WordIndex) -> Option<&str> {
        self.words.get(index as usize).map(|w| w.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WordMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Source and target vocabularies shared by the rule table, the language
/// model and the sentence builder
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub source: WordMap,
    pub target: WordMap,
}

impl Vocabulary {
    pub fn new() -> Self {
        let mut target = WordMap::new();
        target.intern(SENTENCE_START);
        target.intern(SENTENCE_END);
        Vocabulary {
            source: WordMap::new(),
            target,
        }
    }

    pub fn sentence_start(&self) -> WordIndex {
        self.target.index_of(SENTENCE_START)
    }

    pub fn sentence_end(&self) -> WordIndex {
        self.target.index_of(SENTENCE_END)
    }

    /// Render target indexes back to words, skipping indexes not in the map
    pub fn target_words(&self, indexes: &[WordIndex]) -> Vec<String> {
        indexes
            .iter()
            .filter_map(|&i| self.target.word(i))
            .map(|w| w.to_string())
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_word_is_index_zero() {
        let map = WordMap::new();
        assert_eq!(map.index_of(UNKNOWN_WORD), UNKNOWN_WORD_INDEX);
        assert_eq!(map.index_of("never-seen"), UNKNOWN_WORD_INDEX);
        assert_eq!(map.get("never-seen"), None);
    }

    #[test]
    fn test_intern_is_idempotent() {
        let mut map = WordMap::new();
        let a = map.intern("house");
        let b = map.intern("house");
        assert_eq!(a, b);
        assert_eq!(map.word(a), Some("house"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_target_side_knows_sentence_markers() {
        let vocab = Vocabulary::new();
        assert_ne!(vocab.sentence_start(), UNKNOWN_WORD_INDEX);
        assert_ne!(vocab.sentence_end(), vocab.sentence_start());
        assert_eq!(
            vocab.target_words(&[vocab.sentence_start(), vocab.sentence_end()]),
            vec!["<s>", "</s>"]
        );
    }
}
