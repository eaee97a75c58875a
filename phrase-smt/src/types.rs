/// Negative log-domain score; lower is better
pub type Cost = f64;

/// Index of a word in a [`crate::vocab::Vocabulary`]
pub type WordIndex = u32;

/// Index reserved for the unknown word on both vocabulary sides
pub const UNKNOWN_WORD_INDEX: WordIndex = 0;

/// Surface form of the unknown word in rule tables
pub const UNKNOWN_WORD: &str = "<unknown-word>";

pub const SENTENCE_START: &str = "<s>";
pub const SENTENCE_END: &str = "</s>";
