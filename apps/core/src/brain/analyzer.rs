//! Batch analyzer - runs one analysis over a question collection and reduces
//! it to label counts.
//!
//! Work is split in two steps so it can be fanned out:
//! 1. `tally` processes any slice of questions into a mergeable [`Tally`]
//! 2. `finalize` turns the merged tally into an [`AnalysisReport`], deciding
//!    placeholders and degradation once for the whole batch

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::intent::IntentClassifier;
use super::interrogative::question_word;
use super::lexical::{extract_general, extract_verbs};
use super::normalizer::non_empty;
use super::result::{AnalysisReport, AnalysisResult, DegradeReason, Outcome};
use super::sentiment::{
    default_scorer, placeholder_distribution, score_question, shares_with_emoji, SentimentScorer,
    SentimentStats,
};
use super::tagger::{default_tagger, PosTagger};
use crate::error::AppError;
use crate::models::{AnalysisKind, AnalysisRequest, LexicalMode, VerbConfig};

/// Partial result over some of a batch's questions. Tallies merge by summation.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub counts: AnalysisResult,
    pub analyzed: usize,
    pub skipped: usize,
    /// Compound scores, sentiment only.
    pub scores: Vec<f64>,
    pub degraded: Option<DegradeReason>,
}

impl Tally {
    pub fn merge(&mut self, other: Tally) {
        self.counts.merge(other.counts);
        self.analyzed += other.analyzed;
        self.skipped += other.skipped;
        self.scores.extend(other.scores);
        if self.degraded.is_none() {
            self.degraded = other.degraded;
        }
    }

    fn skip_all(count: usize, reason: DegradeReason) -> Self {
        Self {
            skipped: count,
            degraded: Some(reason),
            ..Self::default()
        }
    }
}

/// Runs analyses over question batches.
///
/// The tagger and scorer are optional: when one is missing, the analyses that
/// need it degrade instead of failing.
pub struct BatchAnalyzer {
    intent_classifier: IntentClassifier,
    tagger: Option<Arc<dyn PosTagger>>,
    scorer: Option<Arc<dyn SentimentScorer>>,
}

impl Default for BatchAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchAnalyzer {
    /// Create an analyzer backed by the built-in tagger and scorer.
    pub fn new() -> Self {
        Self {
            intent_classifier: IntentClassifier::new(),
            tagger: default_tagger().map(|t| t as Arc<dyn PosTagger>),
            scorer: default_scorer().map(|s| s as Arc<dyn SentimentScorer>),
        }
    }

    pub fn with_tagger(mut self, tagger: Arc<dyn PosTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Drop the tagger, as if it had failed to load.
    pub fn without_tagger(mut self) -> Self {
        self.tagger = None;
        self
    }

    /// Drop the scorer, as if it had failed to load.
    pub fn without_scorer(mut self) -> Self {
        self.scorer = None;
        self
    }

    /// Process a slice of questions. Blank questions are ignored.
    pub fn tally(&self, kind: AnalysisKind, questions: &[String], config: &VerbConfig) -> Tally {
        let mut tally = Tally::default();

        match kind {
            AnalysisKind::Lexical(LexicalMode::All) => {
                for question in non_empty(questions) {
                    for word in extract_general(question) {
                        tally.counts.increment(&word);
                    }
                    tally.analyzed += 1;
                }
            }
            AnalysisKind::Lexical(LexicalMode::Verbs) => {
                let Some(tagger) = &self.tagger else {
                    return Tally::skip_all(
                        non_empty(questions).count(),
                        DegradeReason::TaggerUnavailable("tagger failed to load".to_string()),
                    );
                };
                for question in non_empty(questions) {
                    match extract_verbs(question, config, tagger.as_ref()) {
                        Ok(words) => {
                            for word in words {
                                tally.counts.increment(&word);
                            }
                            tally.analyzed += 1;
                        }
                        Err(e) => {
                            warn!(error = %e, "Skipping question that could not be tagged");
                            tally.skipped += 1;
                        }
                    }
                }
            }
            AnalysisKind::Intent => {
                for question in non_empty(questions) {
                    let result = self.intent_classifier.classify(question);
                    tally.counts.increment(result.category.label());
                    tally.analyzed += 1;
                }
            }
            AnalysisKind::Sentiment => {
                let Some(scorer) = &self.scorer else {
                    return Tally::skip_all(
                        non_empty(questions).count(),
                        DegradeReason::ScorerUnavailable("scorer failed to load".to_string()),
                    );
                };
                for question in non_empty(questions) {
                    match score_question(scorer.as_ref(), question) {
                        Ok(Some(scored)) => {
                            tally.counts.increment(scored.label.label());
                            tally.scores.push(scored.score);
                            tally.analyzed += 1;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "Skipping question that could not be scored");
                            tally.skipped += 1;
                        }
                    }
                }
            }
            AnalysisKind::QuestionWords => {
                for question in non_empty(questions) {
                    tally.counts.increment(question_word(question));
                    tally.analyzed += 1;
                }
            }
        }

        tally
    }

    /// Turn a merged tally into a report.
    ///
    /// A batch in which every question failed is degraded: verb mode reports
    /// the (empty) counts, sentiment reports the placeholder distribution.
    pub fn finalize(
        &self,
        kind: AnalysisKind,
        record_count: usize,
        mut tally: Tally,
        started: Instant,
    ) -> AnalysisReport {
        if tally.degraded.is_none() && tally.analyzed == 0 && tally.skipped > 0 {
            let detail = format!("all {} questions failed", tally.skipped);
            tally.degraded = match kind {
                AnalysisKind::Lexical(LexicalMode::Verbs) => Some(DegradeReason::TaggerUnavailable(detail)),
                AnalysisKind::Sentiment => Some(DegradeReason::ScorerUnavailable(detail)),
                _ => None,
            };
        }

        let mut sentiment = None;
        if kind == AnalysisKind::Sentiment {
            if tally.degraded.is_some() {
                tally.counts = placeholder_distribution();
            } else {
                sentiment = SentimentStats::from_scores(&tally.scores);
            }
        }

        let percentages = if kind == AnalysisKind::Sentiment {
            shares_with_emoji(&tally.counts)
        } else {
            tally.counts.percentages()
        };

        if let Some(reason) = &tally.degraded {
            warn!(mode = kind.mode_label(), "Returning degraded result: {}", reason);
        }

        AnalysisReport {
            request_id: Uuid::new_v4(),
            analysis: kind,
            mode: kind.mode_label().to_string(),
            record_count,
            analyzed_count: tally.analyzed,
            skipped_count: tally.skipped,
            counts: tally.counts,
            percentages,
            degraded: tally.degraded,
            sentiment,
            processing_time_ms: started.elapsed().as_millis() as u64,
            generated_at: Utc::now(),
        }
    }

    /// Run a request on the current thread.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AppError> {
        let started = Instant::now();
        ensure_input(request)?;

        let config = request.resolved_verb_config();
        let tally = self.tally(request.kind, &request.questions, &config);
        let report = self.finalize(request.kind, request.resolved_record_count(), tally, started);

        info!("Analysis complete: {}", report.summary());
        Ok(report)
    }

    /// Word frequencies in the given mode. Verb mode uses `config` or the defaults.
    pub fn lexical_frequency(
        &self,
        questions: &[String],
        mode: LexicalMode,
        config: Option<&VerbConfig>,
    ) -> Result<Outcome<AnalysisResult>, AppError> {
        let mut request = AnalysisRequest::lexical(questions.to_vec(), mode);
        if let Some(config) = config {
            request = request.with_verb_config(config.clone());
        }
        Ok(self.analyze(&request)?.outcome())
    }

    /// Intent category counts. Never degraded.
    pub fn intent_distribution(&self, questions: &[String]) -> Result<AnalysisResult, AppError> {
        let request = AnalysisRequest::intents(questions.to_vec());
        Ok(self.analyze(&request)?.counts)
    }

    /// Sentiment label counts, or the placeholder when nothing could be scored.
    pub fn sentiment_distribution(
        &self,
        questions: &[String],
    ) -> Result<Outcome<AnalysisResult>, AppError> {
        let request = AnalysisRequest::sentiment(questions.to_vec());
        Ok(self.analyze(&request)?.outcome())
    }

    /// Question-word family counts. Never degraded.
    pub fn question_word_distribution(&self, questions: &[String]) -> Result<AnalysisResult, AppError> {
        let request = AnalysisRequest::question_words(questions.to_vec());
        Ok(self.analyze(&request)?.counts)
    }
}

/// Fails with `InputEmpty` when the request has no non-blank question.
pub fn ensure_input(request: &AnalysisRequest) -> Result<(), AppError> {
    if non_empty(&request.questions).next().is_none() {
        return Err(AppError::InputEmpty(request.kind.stage().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::tagger::TaggedToken;

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn compound(&self, _text: &str) -> Result<f64, AppError> {
            Ok(self.0)
        }
    }

    /// Fails on any text containing "boom".
    struct Picky;

    impl SentimentScorer for Picky {
        fn compound(&self, text: &str) -> Result<f64, AppError> {
            if text.contains("boom") {
                Err(AppError::Scoring("boom".to_string()))
            } else {
                Ok(-0.7)
            }
        }
    }

    struct FailingTagger;

    impl PosTagger for FailingTagger {
        fn tag(&self, _tokens: &[String]) -> Result<Vec<TaggedToken>, AppError> {
            Err(AppError::Tagging("no".to_string()))
        }
    }

    fn qs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_is_input_empty() {
        let analyzer = BatchAnalyzer::new();
        for questions in [vec![], qs(&["", "   ", "\n"])] {
            let err = analyzer.intent_distribution(&questions).unwrap_err();
            assert!(err.is_input_empty(), "Expected InputEmpty, got {:?}", err);
        }
        let err = analyzer.sentiment_distribution(&[]).unwrap_err();
        assert!(err.to_string().contains("sentiment bucketing"));
    }

    #[test]
    fn test_intent_distribution() {
        let analyzer = BatchAnalyzer::new();
        let counts = analyzer
            .intent_distribution(&qs(&[
                "How many depositions are there?",
                "List all depositions",
                "List all medications",
                "",
                "asdfqwer",
            ]))
            .unwrap();
        assert_eq!(counts.get("AGGREGATE"), 1);
        assert_eq!(counts.get("EXTRACT"), 2);
        assert_eq!(counts.get("CONVERSATION"), 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_sentiment_with_stub_scorer() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(Fixed(0.85)));
        let outcome = analyzer
            .sentiment_distribution(&qs(&["I love this tool, it's amazing!"]))
            .unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.data().get("very_positive"), 1);
        assert_eq!(outcome.data().total(), 1);
    }

    #[test]
    fn test_sentiment_skips_failing_questions() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(Picky));
        let report = analyzer
            .analyze(&AnalysisRequest::sentiment(qs(&["fine", "boom", "also fine"])))
            .unwrap();
        assert!(!report.is_degraded());
        assert_eq!(report.analyzed_count, 2);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.counts.get("very_negative"), 2);
        let stats = report.sentiment.unwrap();
        assert_eq!(stats.most_negative, -0.7);
    }

    #[test]
    fn test_sentiment_placeholder_when_scorer_missing() {
        let analyzer = BatchAnalyzer::new().without_scorer();
        let outcome = analyzer.sentiment_distribution(&qs(&["hello"])).unwrap();
        assert!(matches!(outcome.reason(), Some(DegradeReason::ScorerUnavailable(_))));
        assert_eq!(outcome.data(), &placeholder_distribution());
    }

    #[test]
    fn test_report_percentages() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(Fixed(0.85)));
        let report = analyzer
            .analyze(&AnalysisRequest::sentiment(qs(&["great", "fine"])))
            .unwrap();
        assert_eq!(report.percentages.len(), 1);
        assert_eq!(report.percentages[0].label, "very_positive");
        assert_eq!(report.percentages[0].percentage, 100.0);
        assert_eq!(report.percentages[0].emoji.as_deref(), Some("😍"));

        let report = analyzer
            .analyze(&AnalysisRequest::intents(qs(&[
                "List all depositions",
                "List all medications",
                "Draft a demand letter",
                "Draft a demand letter",
            ])))
            .unwrap();
        let labels: Vec<&str> = report.percentages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["DRAFT", "EXTRACT"]);
        assert!(report.percentages.iter().all(|s| s.percentage == 50.0 && s.emoji.is_none()));
    }

    #[test]
    fn test_sentiment_placeholder_when_every_question_fails() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(Picky));
        let report = analyzer
            .analyze(&AnalysisRequest::sentiment(qs(&["boom", "boom again"])))
            .unwrap();
        assert!(report.is_degraded());
        assert_eq!(report.counts, placeholder_distribution());
        assert!(report.sentiment.is_none());
    }

    #[test]
    fn test_verbs_degrade_without_tagger() {
        let analyzer = BatchAnalyzer::new().without_tagger();
        let outcome = analyzer
            .lexical_frequency(&qs(&["File the claim"]), LexicalMode::Verbs, None)
            .unwrap();
        assert!(matches!(outcome.reason(), Some(DegradeReason::TaggerUnavailable(_))));
        assert!(outcome.data().is_empty());
    }

    #[test]
    fn test_verbs_degrade_when_every_question_fails() {
        let analyzer = BatchAnalyzer::new().with_tagger(Arc::new(FailingTagger));
        let report = analyzer
            .analyze(&AnalysisRequest::lexical(qs(&["a b c", "d e f"]), LexicalMode::Verbs))
            .unwrap();
        assert!(report.is_degraded());
        assert_eq!(report.skipped_count, 2);
        assert!(report.counts.is_empty());
    }

    #[test]
    fn test_general_mode_ignores_tagger() {
        let analyzer = BatchAnalyzer::new().without_tagger();
        let outcome = analyzer
            .lexical_frequency(&qs(&["Depositions depositions witnesses"]), LexicalMode::All, None)
            .unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.data().get("depositions"), 2);
        assert_eq!(outcome.data().get("witnesses"), 1);
    }

    #[test]
    fn test_zero_matches_is_complete() {
        let analyzer = BatchAnalyzer::new();
        let outcome = analyzer
            .lexical_frequency(&qs(&["it is what it is"]), LexicalMode::All, None)
            .unwrap();
        assert!(!outcome.is_degraded());
        assert!(outcome.data().is_empty());
    }

    #[test]
    fn test_record_count_and_mode() {
        let analyzer = BatchAnalyzer::new();
        let report = analyzer
            .analyze(&AnalysisRequest::question_words(qs(&["What now?", "Why?"])).with_record_count(7))
            .unwrap();
        assert_eq!(report.record_count, 7);
        assert_eq!(report.mode, "question-words");
        assert_eq!(report.counts.get("What"), 1);
        assert_eq!(report.counts.get("Why"), 1);
    }

    #[test]
    fn test_tally_merge_matches_single_pass() {
        let analyzer = BatchAnalyzer::new();
        let questions = qs(&[
            "How many depositions are there?",
            "Who is the adjuster?",
            "Thanks so much, goodbye!",
            "Draft a demand letter",
            "asdfqwer?",
        ]);
        let config = VerbConfig::default();
        let whole = analyzer.tally(AnalysisKind::Intent, &questions, &config);

        let mut merged = Tally::default();
        for chunk in questions.chunks(2).rev() {
            merged.merge(analyzer.tally(AnalysisKind::Intent, chunk, &config));
        }
        assert_eq!(whole.counts, merged.counts);
        assert_eq!(whole.analyzed, merged.analyzed);
    }
}
