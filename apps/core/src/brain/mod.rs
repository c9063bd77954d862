//! # Brain Module
//!
//! Question analysis for QueryLens. Every analyzer is a pure function of its
//! input plus static tables, so batches can be split and merged freely.
//!
//! ## Components
//! - `normalizer`: lower-casing and word tokenization
//! - `tagger`: part-of-speech tagging behind the `PosTagger` trait
//! - `lexical`: content-word and verb extraction for word clouds
//! - `intent`: ordered-table intent classification
//! - `sentiment`: compound scoring and five-band bucketing
//! - `interrogative`: question-word breakdown
//! - `result`: label counts, `Outcome` and the report
//! - `analyzer`: batch orchestrator

pub mod analyzer;
pub mod intent;
pub mod interrogative;
pub mod lexical;
pub mod normalizer;
pub mod result;
pub mod sentiment;
pub mod tagger;

pub use analyzer::{BatchAnalyzer, Tally};
pub use intent::{Category, IntentClassifier, IntentResult};
pub use result::{AnalysisReport, AnalysisResult, DegradeReason, LabelShare, Outcome};
pub use sentiment::{LexiconScorer, SentimentLabel, SentimentScorer, SentimentStats};
pub use tagger::{LexiconTagger, PosTag, PosTagger, TaggedToken};
