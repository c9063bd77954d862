//! Actor System Tests
//!
//! Tests for the analysis actor: fan-out parity with the sequential path,
//! degraded and failing collaborators, timeouts and the trait seam.

use crate::actors::{AnalysisActor, AnalysisActorHandle};
use crate::brain::sentiment::placeholder_distribution;
use crate::brain::{AnalysisReport, BatchAnalyzer, DegradeReason, PosTagger, SentimentScorer, TaggedToken};
use crate::error::AppError;
use crate::models::{AnalysisKind, AnalysisRequest, LexicalMode, VerbConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Duration;

// ============================================================================
// Mock Collaborators for Testing
// ============================================================================

/// Scorer that fails on every question.
pub struct FailingScorer;

impl SentimentScorer for FailingScorer {
    fn compound(&self, _text: &str) -> Result<f64, AppError> {
        Err(AppError::Scoring("model rejected input".to_string()))
    }
}

/// Tagger that takes its time before failing.
pub struct SlowTagger {
    pub delay_ms: u64,
}

impl PosTagger for SlowTagger {
    fn tag(&self, _tokens: &[String]) -> Result<Vec<TaggedToken>, AppError> {
        std::thread::sleep(std::time::Duration::from_millis(self.delay_ms));
        Err(AppError::Tagging("too slow".to_string()))
    }
}

/// Actor that runs requests inline, standing in for the channel-backed one.
pub struct InlineActor {
    analyzer: BatchAnalyzer,
}

#[async_trait]
impl AnalysisActor for InlineActor {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AppError> {
        self.analyzer.analyze(&request)
    }
}

fn sample_questions() -> Vec<String> {
    [
        "How many depositions are there?",
        "List all depositions",
        "Who is the adjuster?",
        "Thanks so much, goodbye!",
        "Please summarize the depositions we received",
        "I love this tool, it's amazing!",
        "When is the deposition scheduled?",
        "Should we settle?",
        "",
        "asdfqwer?",
        "Draft a demand letter",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn all_kinds() -> [AnalysisKind; 5] {
    [
        AnalysisKind::Lexical(LexicalMode::All),
        AnalysisKind::Lexical(LexicalMode::Verbs),
        AnalysisKind::Intent,
        AnalysisKind::Sentiment,
        AnalysisKind::QuestionWords,
    ]
}

/// Any type behind the trait can serve a request.
async fn analyze_with(actor: &dyn AnalysisActor, request: AnalysisRequest) -> Result<AnalysisReport, AppError> {
    actor.analyze(request).await
}

// ============================================================================
// Analysis Actor Tests
// ============================================================================

#[cfg(test)]
mod analysis_actor_tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_matches_sequential() {
        let sequential = BatchAnalyzer::new();

        for workers in [1, 3, 8, 64] {
            let actor = AnalysisActorHandle::new(Arc::new(BatchAnalyzer::new()), workers, Duration::from_secs(10));
            for kind in all_kinds() {
                let request = AnalysisRequest::new(kind, sample_questions());
                let expected = sequential.analyze(&request).unwrap();
                let actual = actor.analyze(request).await.unwrap();

                assert_eq!(actual.counts, expected.counts, "Counts differ for {:?} with {} workers", kind, workers);
                assert_eq!(actual.analyzed_count, expected.analyzed_count);
                assert_eq!(actual.skipped_count, expected.skipped_count);
                assert_eq!(actual.mode, expected.mode);
                assert_eq!(actual.record_count, 11);
            }
        }
    }

    #[tokio::test]
    async fn test_verb_settings_reach_workers() {
        let actor = AnalysisActorHandle::new(Arc::new(BatchAnalyzer::new()), 4, Duration::from_secs(10));
        let request = AnalysisRequest::lexical(sample_questions(), LexicalMode::Verbs)
            .with_verb_config(VerbConfig::no_verb_forms());
        let report = actor.analyze(request).await.unwrap();
        assert!(!report.is_degraded());
        assert!(report.counts.is_empty());
        assert_eq!(report.analyzed_count, 10);
    }

    #[tokio::test]
    async fn test_failing_scorer_yields_placeholder() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(FailingScorer));
        let actor = AnalysisActorHandle::new(Arc::new(analyzer), 3, Duration::from_secs(10));

        let report = actor
            .analyze(AnalysisRequest::sentiment(sample_questions()))
            .await
            .unwrap();
        assert!(matches!(report.degraded, Some(DegradeReason::ScorerUnavailable(_))));
        assert_eq!(report.counts, placeholder_distribution());
        assert_eq!(report.skipped_count, 10);
        assert!(report.sentiment.is_none());
    }

    #[tokio::test]
    async fn test_other_modes_unaffected_by_failing_scorer() {
        let analyzer = BatchAnalyzer::new().with_scorer(Arc::new(FailingScorer));
        let actor = AnalysisActorHandle::new(Arc::new(analyzer), 2, Duration::from_secs(10));

        let report = actor
            .analyze(AnalysisRequest::intents(sample_questions()))
            .await
            .unwrap();
        assert!(!report.is_degraded());
        assert_eq!(report.counts.total(), 10);
    }

    #[tokio::test]
    async fn test_timeout() {
        let analyzer = BatchAnalyzer::new().with_tagger(Arc::new(SlowTagger { delay_ms: 300 }));
        let actor = AnalysisActorHandle::new(Arc::new(analyzer), 1, Duration::from_millis(20));

        let result = actor
            .analyze(AnalysisRequest::lexical(
                vec!["File the claim".to_string()],
                LexicalMode::Verbs,
            ))
            .await;
        assert!(matches!(result, Err(AppError::Timeout(_))), "Expected timeout, got {:?}", result.map(|r| r.summary()));
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let actor = AnalysisActorHandle::new(Arc::new(BatchAnalyzer::new()), 2, Duration::from_secs(10));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let actor = actor.clone();
                tokio::spawn(async move {
                    let questions = vec!["How many depositions are there?".to_string(); i + 1];
                    actor.analyze(AnalysisRequest::intents(questions)).await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let report = handle.await.unwrap().unwrap();
            assert_eq!(report.counts.get("AGGREGATE"), i + 1);
        }
    }

    #[tokio::test]
    async fn test_trait_object_seam() {
        let inline = InlineActor {
            analyzer: BatchAnalyzer::new(),
        };
        let spawned = AnalysisActorHandle::new(Arc::new(BatchAnalyzer::new()), 2, Duration::from_secs(10));

        let request = AnalysisRequest::question_words(sample_questions());
        let a = analyze_with(&inline, request.clone()).await.unwrap();
        let b = analyze_with(&spawned, request).await.unwrap();
        assert_eq!(a.counts, b.counts);

        let empty = analyze_with(&inline, AnalysisRequest::intents(vec![])).await;
        assert!(matches!(empty, Err(AppError::InputEmpty(_))));
    }
}
