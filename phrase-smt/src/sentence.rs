use crate::types::WordIndex;
use crate::vocab::WordMap;

/// One source token with every word index it may be read as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub word_indexes: Vec<WordIndex>,
}

impl Token {
    pub fn new(surface: &str, word_indexes: Vec<WordIndex>) -> Self {
        Token {
            surface: surface.to_string(),
            word_indexes,
        }
    }
}

/// A tokenized source sentence, immutable for the duration of one decode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Sentence { tokens }
    }

    /// Split already-tokenized text on whitespace and map each word through
    /// the source vocabulary (unknown words map to the unknown index)
    pub fn from_text(text: &str, source: &WordMap) -> Self {
        let tokens = text
            .split_whitespace()
            .map(|word| Token::new(word, vec![source.index_of(word)]))
            .collect();
        Sentence { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface forms of `[begin, end)`
    pub fn surfaces(&self, begin: usize, end: usize) -> Vec<String> {
        self.tokens[begin..end]
            .iter()
            .map(|t| t.surface.clone())
            .collect()
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words: Vec<&str> = self.tokens.iter().map(|t| t.surface.as_str()).collect();
        write!(f, "{}", words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_WORD_INDEX;

    #[test]
    fn test_from_text_maps_known_and_unknown() {
        let mut source = WordMap::new();
        let house = source.intern("house");
        let sentence = Sentence::from_text("  the house  ", &source);

        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.tokens()[0].word_indexes, vec![UNKNOWN_WORD_INDEX]);
        assert_eq!(sentence.tokens()[1].word_indexes, vec![house]);
        assert_eq!(sentence.to_string(), "the house");
    }

    #[test]
    fn test_empty_text() {
        let sentence = Sentence::from_text("   ", &WordMap::new());
        assert!(sentence.is_empty());
    }

    #[test]
    fn test_surfaces_slice() {
        let sentence = Sentence::from_text("a b c", &WordMap::new());
        assert_eq!(sentence.surfaces(1, 3), vec!["b", "c"]);
    }
}
