//! Back-off n-gram model read from ARPA text

use crate::error::{DecodeResult, DecoderError};
use crate::types::{UNKNOWN_WORD_INDEX, WordIndex};
use crate::vocab::WordMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Log10 probability of a word the model has never seen
pub const DEFAULT_UNKNOWN_LOG_PROB: f64 = -10.0;

const ARPA_UNKNOWN: &str = "<unk>";

#[derive(Debug, Clone, Copy, PartialEq)]
struct NGramEntry {
    log_prob: f64,
    backoff: f64,
}

#[derive(Debug, Clone)]
pub struct NGramModel {
    order: usize,
    entries: HashMap<Vec<WordIndex>, NGramEntry>,
    unknown_log_prob: f64,
}

impl NGramModel {
    pub fn load_arpa(path: &Path, target: &mut WordMap) -> DecodeResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DecoderError::Io(format!(
                "Failed to read language model {}: {}",
                path.display(),
                e
            ))
        })?;
        let model = Self::from_arpa(&content, target)?;
        info!(
            "Loaded {}-gram language model with {} entries from {}",
            model.order,
            model.entries.len(),
            path.display()
        );
        Ok(model)
    }

    /// Parse ARPA text, interning every word into the target vocabulary
    ///
    /// `<unk>` maps to the unknown word index.
    pub fn from_arpa(content: &str, target: &mut WordMap) -> DecodeResult<Self> {
        let mut order = 0;
        let mut section = None;
        let mut entries = HashMap::new();
        let mut finished = false;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || finished {
                continue;
            }
            let error = |msg: &str| {
                DecoderError::LanguageModel(format!("Line {}: {}", line_no + 1, msg))
            };

            if line == "\\data\\" {
                section = Some(0);
                continue;
            }
            if line == "\\end\\" {
                finished = true;
                continue;
            }
            if let Some(n) = line
                .strip_prefix('\\')
                .and_then(|rest| rest.strip_suffix("-grams:"))
            {
                let n: usize = n.parse().map_err(|_| error("invalid section header"))?;
                if n == 0 || n > order {
                    return Err(error("section not announced in \\data\\"));
                }
                section = Some(n);
                continue;
            }

            match section {
                None => continue,
                Some(0) => {
                    let n = line
                        .strip_prefix("ngram ")
                        .and_then(|rest| rest.split('=').next())
                        .and_then(|n| n.trim().parse::<usize>().ok())
                        .ok_or_else(|| error("invalid ngram count"))?;
                    order = order.max(n);
                }
                Some(n) => {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() != n + 1 && fields.len() != n + 2 {
                        return Err(error(&format!("expected a {}-gram entry", n)));
                    }
                    let log_prob: f64 = fields[0]
                        .parse()
                        .map_err(|_| error("invalid log probability"))?;
                    let backoff: f64 = match fields.get(n + 1) {
                        Some(value) => value.parse().map_err(|_| error("invalid back-off"))?,
                        None => 0.0,
                    };
                    let words = fields[1..=n]
                        .iter()
                        .map(|word| {
                            if *word == ARPA_UNKNOWN {
                                UNKNOWN_WORD_INDEX
                            } else {
                                target.intern(word)
                            }
                        })
                        .collect();
                    entries.insert(words, NGramEntry { log_prob, backoff });
                }
            }
        }

        if order == 0 {
            return Err(DecoderError::LanguageModel(
                "Missing \\data\\ section".to_string(),
            ));
        }
        let unknown_log_prob = entries
            .get(&vec![UNKNOWN_WORD_INDEX])
            .map(|entry| entry.log_prob)
            .unwrap_or(DEFAULT_UNKNOWN_LOG_PROB);

        Ok(NGramModel {
            order,
            entries,
            unknown_log_prob,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Log10 probability of `word` after `context` (oldest word first)
    ///
    /// Only the last `order - 1` context words are used.
    pub fn log_prob(&self, context: &[WordIndex], word: WordIndex) -> f64 {
        let keep = context.len().min(self.order.saturating_sub(1));
        let context = &context[context.len() - keep..];
        self.backed_off(context, word)
    }

    fn backed_off(&self, context: &[WordIndex], word: WordIndex) -> f64 {
        let mut ngram = context.to_vec();
        ngram.push(word);
        if let Some(entry) = self.entries.get(&ngram) {
            return entry.log_prob;
        }
        if context.is_empty() {
            return self.unknown_log_prob;
        }
        let backoff = self
            .entries
            .get(context)
            .map(|entry| entry.backoff)
            .unwrap_or(0.0);
        backoff + self.backed_off(&context[1..], word)
    }
}
