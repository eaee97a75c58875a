/// Error types for the decoder and its collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderError {
    /// Invalid configuration value, detected before any sentence is decoded
    Config(String),
    /// Rule table is unusable (e.g. no rule for the unknown word)
    RuleTable(String),
    /// Language model could not be built
    LanguageModel(String),
    /// File system error with context
    Io(String),
    /// Malformed input line or document
    Parse(String),
    /// Search finished without a full-coverage hypothesis
    NoTranslationFound(String),
}

impl std::fmt::Display for DecoderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DecoderError::RuleTable(msg) => write!(f, "Rule table error: {}", msg),
            DecoderError::LanguageModel(msg) => write!(f, "Language model error: {}", msg),
            DecoderError::Io(msg) => write!(f, "I/O error: {}", msg),
            DecoderError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DecoderError::NoTranslationFound(sentence) => {
                write!(f, "No translation found for: {}", sentence)
            }
        }
    }
}

impl std::error::Error for DecoderError {}

/// Result type for decoder operations
pub type DecodeResult<T> = Result<T, DecoderError>;
