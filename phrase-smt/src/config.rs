//! Configuration for the decoder and the translator built around it
//!
//! All values are read-only once a [`crate::Translator`] has been created.
//! Invalid values are rejected by `validate()` before any sentence is decoded.
//!
//! # Example
//!
//! ```json
//! {
//!     "rule_table": "model/phrase-table.txt",
//!     "language_model": "model/lm.arpa",
//!     "weights": { "phrase_table": [1.0, 1.0], "language_model": 0.5 },
//!     "decoder": { "search_beam_width": 5.0, "hard_reordering_jump_limit": 4 }
//! }
//! ```

use crate::error::{DecodeResult, DecoderError};
use crate::types::Cost;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Search knobs consumed while decoding a sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum cost gap to the best hypothesis of a cardinality
    pub search_beam_width: Cost,
    /// Hard cap on hypotheses kept per cardinality
    pub max_cardinality_container_size: usize,
    /// Cheapest nodes reserved per coverage while pruning (0 disables)
    pub primary_coverage_share: usize,
    /// Maximum distance between the first uncovered position and a new phrase end
    pub hard_reordering_jump_limit: usize,
    /// Optional limit on uncovered positions before the last covered one
    pub reordering_constraint_maximum_runs: Option<usize>,
    /// Candidates considered per source span
    pub max_target_phrase_count: usize,
    pub do_compute_position_specific_rest_costs: bool,
    /// Reject new hypotheses against the cost ceiling before inserting them
    pub do_prune_pre_insertion: bool,
    /// Recombine same-future hypotheses and keep the dominated ones as alternatives
    pub keep_recombined: bool,
    /// Node count above which insertion triggers a pruning pass
    pub lazy_pruning_threshold: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            search_beam_width: 5.0,
            max_cardinality_container_size: 100,
            primary_coverage_share: 0,
            hard_reordering_jump_limit: 6,
            reordering_constraint_maximum_runs: None,
            max_target_phrase_count: 100,
            do_compute_position_specific_rest_costs: true,
            do_prune_pre_insertion: true,
            keep_recombined: true,
            lazy_pruning_threshold: 0,
        }
    }
}

impl DecoderConfig {
    /// Check every numeric knob, failing on the first invalid one
    pub fn validate(&self) -> DecodeResult<()> {
        if !self.search_beam_width.is_finite() || self.search_beam_width < 0.0 {
            return Err(DecoderError::Config(format!(
                "search_beam_width must be a finite non-negative number, got {}",
                self.search_beam_width
            )));
        }
        if self.max_cardinality_container_size == 0 {
            return Err(DecoderError::Config(
                "max_cardinality_container_size must be at least 1".to_string(),
            ));
        }
        if self.max_target_phrase_count == 0 {
            return Err(DecoderError::Config(
                "max_target_phrase_count must be at least 1".to_string(),
            ));
        }
        if self.primary_coverage_share > self.max_cardinality_container_size {
            return Err(DecoderError::Config(format!(
                "primary_coverage_share ({}) cannot exceed max_cardinality_container_size ({})",
                self.primary_coverage_share, self.max_cardinality_container_size
            )));
        }
        Ok(())
    }
}

/// Scaling factors applied by the built-in feature functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    /// One weight per rule-table cost column; missing columns get weight 0
    pub phrase_table: Vec<Cost>,
    pub language_model: Cost,
    pub word_penalty: Cost,
    pub distortion: Cost,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            phrase_table: vec![1.0],
            language_model: 1.0,
            word_penalty: 0.0,
            distortion: 0.0,
        }
    }
}

impl FeatureWeights {
    pub fn validate(&self) -> DecodeResult<()> {
        let all = self.phrase_table.iter().chain([
            &self.language_model,
            &self.word_penalty,
            &self.distortion,
        ]);
        for weight in all {
            if !weight.is_finite() {
                return Err(DecoderError::Config(format!(
                    "feature weights must be finite, got {}",
                    weight
                )));
            }
        }
        Ok(())
    }
}

/// Everything needed to build a [`crate::Translator`] from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Plain text rule table
    pub rule_table: PathBuf,
    /// ARPA language model; the LM feature is disabled when absent
    #[serde(default)]
    pub language_model: Option<PathBuf>,
    /// Pass unknown words through when the table has no `<unknown-word>` rule
    #[serde(default)]
    pub unknown_word_pass_through: bool,
    #[serde(default)]
    pub weights: FeatureWeights,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

impl TranslatorConfig {
    /// Load a configuration from a JSON file
    ///
    /// Relative model paths are resolved against the directory of the
    /// configuration file.
    ///
    /// # Errors
    /// - File not found or unreadable
    /// - Invalid JSON or unknown value types
    /// - Invalid knob values (see [`DecoderConfig::validate`])
    pub fn from_file(path: &Path) -> DecodeResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DecoderError::Io(format!(
                "Failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_json(&content).map_err(|e| match e {
            DecoderError::Parse(msg) => {
                DecoderError::Parse(format!("{} (in '{}')", msg, path.display()))
            }
            other => other,
        })?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string
    pub fn from_json(json: &str) -> DecodeResult<Self> {
        let config: TranslatorConfig = serde_json::from_str(json)
            .map_err(|e| DecoderError::Parse(format!("Invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DecodeResult<()> {
        self.decoder.validate()?;
        self.weights.validate()
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if self.rule_table.is_relative() {
            self.rule_table = base.join(&self.rule_table);
        }
        if let Some(lm) = self.language_model.as_mut() {
            if lm.is_relative() {
                *lm = base.join(&*lm);
            }
        }
    }
}
