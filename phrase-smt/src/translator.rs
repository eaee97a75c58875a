//! Sentence-level translation facade
//!
//! A [`Translator`] bundles everything that stays fixed between sentences
//! (vocabulary, rule table, feature functions, decoder configuration) and
//! runs one independent decode per call. It is `Send + Sync`, so front ends
//! share it behind an `Arc` and decode sentences on worker threads.
//!
//! # Example
//!
//! ```ignore
//! use phrase_smt::{Translator, TranslatorConfig};
//! use std::path::Path;
//!
//! let config = TranslatorConfig::from_file(Path::new("model/config.json"))?;
//! let translator = Translator::from_config(&config)?;
//! let translation = translator.translate("das haus ist klein")?;
//! println!("{} ({:.3})", translation.text, translation.cost);
//! ```

use crate::config::{DecoderConfig, TranslatorConfig};
use crate::error::DecodeResult;
use crate::feature::{DistortionModel, FeatureSet, LanguageModel, PhraseTable, WordPenalty};
use crate::lm::NGramModel;
use crate::rule_table::{RuleTable, load_plain_rule_table};
use crate::search::{DecodeContext, DecodedSentence, Decoder};
use crate::sentence::Sentence;
use crate::types::Cost;
use crate::vocab::Vocabulary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One translated phrase with its source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedPhrase {
    pub source_begin: usize,
    pub source_end: usize,
    pub source: String,
    pub target: String,
}

/// Result of translating one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub cost: Cost,
    pub phrases: Vec<TranslatedPhrase>,
}

impl Translation {
    /// Untranslated copy of the input, used when decoding fails
    pub fn pass_through(text: &str) -> Self {
        Translation {
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            cost: 0.0,
            phrases: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct Translator {
    vocab: Arc<Vocabulary>,
    rule_table: Arc<RuleTable>,
    features: Arc<FeatureSet>,
    config: Arc<DecoderConfig>,
}

impl Translator {
    /// # Errors
    ///
    /// `DecoderError::Config` when a decoder knob is invalid.
    pub fn new(
        vocab: Vocabulary,
        rule_table: RuleTable,
        features: FeatureSet,
        config: DecoderConfig,
    ) -> DecodeResult<Self> {
        config.validate()?;
        Ok(Translator {
            vocab: Arc::new(vocab),
            rule_table: Arc::new(rule_table),
            features: Arc::new(features),
            config: Arc::new(config),
        })
    }

    /// Load the rule table and optional language model named in `config` and
    /// register a feature function for every non-zero weight
    pub fn from_config(config: &TranslatorConfig) -> DecodeResult<Self> {
        config.validate()?;
        let mut vocab = Vocabulary::new();
        let rule_table = load_plain_rule_table(
            &config.rule_table,
            &mut vocab,
            config.unknown_word_pass_through,
        )?;

        let weights = &config.weights;
        let mut features = FeatureSet::new();
        features.push(Box::new(PhraseTable::new(weights.phrase_table.clone())));
        if weights.word_penalty != 0.0 {
            features.push(Box::new(WordPenalty::new(weights.word_penalty)));
        }
        if weights.distortion != 0.0 {
            features.push(Box::new(DistortionModel::new(weights.distortion)));
        }
        if let Some(path) = &config.language_model {
            let model = NGramModel::load_arpa(path, &mut vocab.target)?;
            features.push(Box::new(LanguageModel::new(
                model,
                weights.language_model,
                &vocab,
            )));
        }
        info!("Translator ready with features: {}", features.names().join(", "));

        Self::new(vocab, rule_table, features, config.decoder.clone())
    }

    /// Tokenize `text` on whitespace and translate it
    ///
    /// # Errors
    ///
    /// `DecoderError::NoTranslationFound` when the search ends without a
    /// complete hypothesis; callers usually fall back to
    /// [`Translation::pass_through`].
    pub fn translate(&self, text: &str) -> DecodeResult<Translation> {
        let sentence = Sentence::from_text(text, &self.vocab.source);
        self.translate_sentence(&sentence)
    }

    pub fn translate_sentence(&self, sentence: &Sentence) -> DecodeResult<Translation> {
        let context = DecodeContext {
            config: &self.config,
            features: &self.features,
            rule_table: &self.rule_table,
        };
        let mut decoder = Decoder::new(context, sentence);
        let decoded = decoder.decode()?;
        debug!(
            "Decoded {} words: cost {:.4}, {:?}",
            sentence.len(),
            decoded.cost,
            decoder.statistics()
        );
        Ok(self.render(sentence, &decoded))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn decoder_config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    fn render(&self, sentence: &Sentence, decoded: &DecodedSentence) -> Translation {
        let phrases: Vec<TranslatedPhrase> = decoded
            .phrases
            .iter()
            .map(|phrase| {
                let source = sentence.surfaces(phrase.begin, phrase.end).join(" ");
                let target = if phrase.rule.pass_through {
                    source.clone()
                } else {
                    self.vocab.target_words(&phrase.rule.target).join(" ")
                };
                TranslatedPhrase {
                    source_begin: phrase.begin,
                    source_end: phrase.end,
                    source,
                    target,
                }
            })
            .collect();
        let text = phrases
            .iter()
            .map(|p| p.target.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Translation {
            text,
            cost: decoded.cost,
            phrases,
        }
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("features", &self.features)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecoderError;
    use crate::testing::rule_table;
    use std::fs;

    fn translator(entries: &[(&str, &str, Cost)]) -> Translator {
        let (table, vocab) = rule_table(entries);
        let features = FeatureSet::new()
            .with(Box::new(PhraseTable::new(vec![1.0])))
            .with(Box::new(DistortionModel::new(0.1)));
        Translator::new(vocab, table, features, DecoderConfig::default()).unwrap()
    }

    #[test]
    fn test_translate_sentence() {
        let translator = translator(&[
            ("a", "X", 1.0),
            ("b", "Y", 1.0),
            ("c", "Z", 1.0),
            ("a b", "W", 1.5),
        ]);
        let translation = translator.translate("a b c").unwrap();
        assert_eq!(translation.text, "W Z");
        assert_eq!(translation.cost, 2.5);
        assert_eq!(translation.phrases.len(), 2);
        assert_eq!(translation.phrases[0].source, "a b");
        assert_eq!(translation.phrases[0].target, "W");
        assert_eq!(
            (translation.phrases[1].source_begin, translation.phrases[1].source_end),
            (2, 3)
        );
    }

    #[test]
    fn test_unknown_word_is_copied() {
        let translator = translator(&[("a", "X", 1.0)]);
        let translation = translator.translate("a Zürich").unwrap();
        assert_eq!(translation.text, "X Zürich");
    }

    #[test]
    fn test_empty_input() {
        let translator = translator(&[("a", "X", 1.0)]);
        let translation = translator.translate("").unwrap();
        assert_eq!(translation.text, "");
        assert!(translation.phrases.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (table, vocab) = rule_table(&[("a", "X", 1.0)]);
        let config = DecoderConfig {
            max_cardinality_container_size: 0,
            ..DecoderConfig::default()
        };
        let result = Translator::new(vocab, table, FeatureSet::new(), config);
        assert!(matches!(result, Err(DecoderError::Config(_))));
    }

    #[test]
    fn test_pass_through_translation() {
        let translation = Translation::pass_through("  das   Haus ");
        assert_eq!(translation.text, "das Haus");
        assert_eq!(translation.cost, 0.0);
    }

    #[test]
    fn test_translation_serializes() {
        let translator = translator(&[("a", "X", 1.0)]);
        let translation = translator.translate("a").unwrap();
        let json = serde_json::to_value(&translation).unwrap();
        assert_eq!(json["text"], "X");
        assert_eq!(json["phrases"][0]["source"], "a");
    }

    #[test]
    fn test_from_config_files() {
        let dir = std::env::temp_dir().join(format!("phrase-smt-translator-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("rules.txt"),
            "1.0 # X # das # the\n1.0 # X # haus # house\n0.5 # X # das haus # the house\n",
        )
        .unwrap();
        fs::write(
            dir.join("lm.arpa"),
            "\\data\\\nngram 1=4\n\n\\1-grams:\n-1.0 <s>\n-0.5 the\n-0.5 house\n-0.5 </s>\n\n\\end\\\n",
        )
        .unwrap();
        fs::write(
            dir.join("config.json"),
            r#"{
                "rule_table": "rules.txt",
                "language_model": "lm.arpa",
                "unknown_word_pass_through": true,
                "weights": {
                    "phrase_table": [1.0],
                    "language_model": 1.0,
                    "word_penalty": -0.1,
                    "distortion": 0.5
                }
            }"#,
        )
        .unwrap();

        let config = TranslatorConfig::from_file(&dir.join("config.json")).unwrap();
        let translator = Translator::from_config(&config).unwrap();
        assert_eq!(
            translator.features().names(),
            vec!["PhraseTable", "WordPenalty", "DistortionModel", "LanguageModel"]
        );

        let translation = translator.translate("das haus bleibt").unwrap();
        assert_eq!(translation.text, "the house bleibt");
        assert_eq!(translation.phrases.last().unwrap().target, "bleibt");

        fs::remove_dir_all(&dir).unwrap();
    }
}
