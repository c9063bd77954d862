//! Integration Tests
//!
//! End-to-end tests from a record file and environment settings through the
//! actor to a serialized report.

use crate::actors::{AnalysisActor, AnalysisActorHandle};
use crate::config::{self, AppConfig, LogFormat};
use crate::models::{AnalysisRequest, LexicalMode, VerbConfig};
use crate::source;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

// ============================================================================
// Test Fixtures
// ============================================================================

const RECORDS: &str = r#"[
    {"Original Question": "How many depositions are there?", "id": 1},
    {"Original Question": "Thanks so much, goodbye!", "id": 2},
    {"Original Question": "I love this tool, it's amazing!", "id": 3},
    {"Original Question": "Please summarize the depositions we received", "id": 4},
    {"Original Question": "   ", "id": 5},
    {"id": 6}
]"#;

fn write_records(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write records");
    file
}

fn test_config(path: &Path) -> AppConfig {
    AppConfig {
        data_file: path.to_path_buf(),
        workers: 2,
        ..AppConfig::default()
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_file_to_intent_report() {
        let file = write_records(RECORDS);
        let config = test_config(file.path());

        let batch = source::load_questions(&config.data_file, &config.question_field).unwrap();
        assert_eq!(batch.record_count, 6);
        assert_eq!(batch.questions.len(), 4);

        let actor = AnalysisActorHandle::from_config(&config);
        let report = actor
            .analyze(AnalysisRequest::intents(batch.questions).with_record_count(batch.record_count))
            .await
            .unwrap();

        assert_eq!(report.record_count, 6);
        assert_eq!(report.analyzed_count, 4);
        assert_eq!(report.counts.get("AGGREGATE"), 1);
        // The closing and the unmatched exclamation both fall back to CONVERSATION.
        assert_eq!(report.counts.get("CONVERSATION"), 2);
        assert_eq!(report.counts.get("SUMMARIZE"), 1);
        assert_eq!(report.counts.total(), 4);
        assert_eq!(report.percentages[0].label, "CONVERSATION");
        assert_eq!(report.percentages[0].percentage, 50.0);
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let file = write_records(RECORDS);
        let config = test_config(file.path());
        let batch = source::load_questions(&config.data_file, &config.question_field).unwrap();

        let actor = AnalysisActorHandle::from_config(&config);
        let report = actor
            .analyze(AnalysisRequest::sentiment(batch.questions).with_record_count(batch.record_count))
            .await
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "sentiment");
        assert_eq!(json["record_count"], 6);
        assert!(json["counts"]["very_positive"].as_u64().unwrap_or(0) >= 1);
        let total: u64 = json["counts"]
            .as_object()
            .unwrap()
            .values()
            .filter_map(|v| v.as_u64())
            .sum();
        assert_eq!(total, 4);
        assert!(json.get("degraded").is_none());
        assert!(json["sentiment"]["average"].is_number());
        assert!(json["request_id"].is_string());
        let shares = json["percentages"].as_array().unwrap();
        assert!(!shares.is_empty());
        assert!(shares.iter().all(|s| s["emoji"].is_string()));
    }

    #[tokio::test]
    async fn test_verb_word_cloud_from_file() {
        let file = write_records(RECORDS);
        let config = test_config(file.path());
        let batch = source::load_questions(&config.data_file, &config.question_field).unwrap();

        let actor = AnalysisActorHandle::from_config(&config);
        let request = AnalysisRequest::lexical(batch.questions, LexicalMode::Verbs)
            .with_verb_config(VerbConfig::from_pairs(["minLength=4", "customExcludes=love"]));
        let report = actor.analyze(request).await.unwrap();

        assert_eq!(report.mode, "verbs");
        assert_eq!(report.counts.get("summarize"), 1);
        assert_eq!(report.counts.get("received"), 1);
        assert_eq!(report.counts.get("love"), 0);
    }

    #[tokio::test]
    async fn test_wrapped_records() {
        let file = write_records(
            r#"{"data": [{"question": "Why did the adjuster deny it?"}, {"question": "What now?"}]}"#,
        );
        let batch = source::load_questions(file.path(), "question").unwrap();
        assert_eq!(batch.questions.len(), 2);

        let actor = AnalysisActorHandle::from_config(&test_config(file.path()));
        let report = actor
            .analyze(AnalysisRequest::question_words(batch.questions))
            .await
            .unwrap();
        assert_eq!(report.counts.get("Why"), 1);
        assert_eq!(report.counts.get("What"), 1);
    }

    #[tokio::test]
    async fn test_records_without_questions_are_input_empty() {
        let file = write_records(r#"[{"Original Question": ""}, {"other": "x"}]"#);
        let config = test_config(file.path());
        let batch = source::load_questions(&config.data_file, &config.question_field).unwrap();
        assert_eq!(batch.record_count, 2);
        assert!(batch.questions.is_empty());

        let actor = AnalysisActorHandle::from_config(&config);
        let err = actor
            .analyze(AnalysisRequest::intents(batch.questions))
            .await
            .unwrap_err();
        assert!(err.is_input_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = source::load_questions(&dir.path().join("absent.json"), "Original Question");
        assert!(matches!(result, Err(crate::error::AppError::Io(_))));
    }
}

#[cfg(test)]
mod environment_tests {
    use super::*;

    #[test]
    fn test_config_from_environment() {
        temp_env::with_vars(
            vec![
                (config::ENV_DATA_FILE, Some("/srv/questions.json")),
                (config::ENV_QUESTION_FIELD, Some("question")),
                (config::ENV_WORKERS, Some("3")),
                (config::ENV_TIMEOUT_SECS, None),
                (config::ENV_LOG_FORMAT, Some("json")),
            ],
            || {
                let config = AppConfig::from_env().unwrap();
                assert_eq!(config.data_file, Path::new("/srv/questions.json"));
                assert_eq!(config.question_field, "question");
                assert_eq!(config.workers, 3);
                assert_eq!(config.timeout_secs, config::DEFAULT_TIMEOUT_SECS);
                assert_eq!(config.log_format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        temp_env::with_vars(
            vec![
                (config::ENV_WORKERS, Some("0")),
                (config::ENV_LOG_FORMAT, None),
            ],
            || {
                let err = AppConfig::from_env().unwrap_err();
                assert!(matches!(err, crate::error::AppError::Validation(_)));
            },
        );
    }
}
