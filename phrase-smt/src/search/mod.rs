//! Beam search over coverage states
//!
//! Hypotheses are grouped by cardinality (number of translated source
//! words) and, inside a cardinality, by exact coverage. The decoder fills the
//! cardinalities in increasing order, extending every surviving hypothesis of
//! a lower cardinality by every admissible phrase.

pub mod candidates;
pub mod cardinality;
pub mod coverage;
pub mod decoder;
pub mod hypothesis;
pub mod lexical;
pub mod rest_cost;

pub use candidates::{PhraseCandidateCollection, PhraseCandidateCollector};
pub use cardinality::CardinalityHypothesisContainer;
pub use coverage::Coverage;
pub use decoder::{DecodeContext, DecodeStatistics, DecodedPhrase, DecodedSentence, Decoder};
pub use hypothesis::Hypothesis;
pub use lexical::LexicalHypothesisContainer;
pub use rest_cost::RestCostMatrix;
