//! Phrase-based statistical machine translation decoder
//!
//! Given a tokenized source sentence and a table of candidate target phrases
//! annotated with feature costs, the decoder searches the ways to segment,
//! reorder and translate the sentence and returns the cheapest complete
//! translation it finds.
//!
//! The search is a beam search over coverage states grouped by cardinality.
//! Hypotheses that cannot be told apart by any feature function are
//! recombined, and an admissible rest-cost estimate keeps hypotheses of
//! different coverage comparable.
//!
//! # Example
//!
//! ```ignore
//! use phrase_smt::{Translator, TranslatorConfig};
//! use std::path::Path;
//!
//! let config = TranslatorConfig::from_file(Path::new("config.json"))?;
//! let translator = Translator::from_config(&config)?;
//! let translation = translator.translate("das haus")?;
//! assert_eq!(translation.text, "the house");
//! ```

pub mod config;
pub mod error;
pub mod feature;
pub mod lm;
pub mod rule_table;
pub mod search;
pub mod sentence;
pub mod translator;
pub mod types;
pub mod vocab;

#[cfg(test)]
mod testing;

pub use config::{DecoderConfig, FeatureWeights, TranslatorConfig};
pub use error::{DecodeResult, DecoderError};
pub use feature::{FeatureFunction, FeatureSet, FeatureState};
pub use rule_table::{RuleTable, TargetRule};
pub use search::{DecodeContext, DecodedSentence, Decoder};
pub use sentence::{Sentence, Token};
pub use translator::{TranslatedPhrase, Translation, Translator};
pub use types::{Cost, WordIndex};
pub use vocab::{Vocabulary, WordMap};
