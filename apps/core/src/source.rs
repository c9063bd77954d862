//! Question source: reads upstream records from a JSON file and pulls the
//! question text out of one field.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::AppError;

/// Questions taken from a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBatch {
    pub questions: Vec<String>,
    /// Number of records read, including those without a usable question.
    pub record_count: usize,
}

/// Parses records from JSON text: either a top-level array or an object
/// with a `data` array.
pub fn parse_records(raw: &str) -> Result<Vec<Value>, AppError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(records) => Ok(records),
        Value::Object(mut wrapper) => match wrapper.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(AppError::Validation(
                "expected an object with a 'data' array of records".to_string(),
            )),
        },
        other => Err(AppError::Validation(format!(
            "expected a JSON array of records, found {}",
            type_name(&other)
        ))),
    }
}

/// Reads and parses a record file.
pub fn load_records(path: &Path) -> Result<Vec<Value>, AppError> {
    let raw = fs::read_to_string(path)?;
    parse_records(&raw)
}

/// Collects the string values of `field`, trimmed; blank, missing and
/// non-string values are skipped.
pub fn extract_questions(records: &[Value], field: &str) -> QuestionBatch {
    let questions: Vec<String> = records
        .iter()
        .filter_map(|record| record.get(field))
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();

    debug!(
        records = records.len(),
        questions = questions.len(),
        field,
        "Extracted questions"
    );

    QuestionBatch {
        questions,
        record_count: records.len(),
    }
}

/// Reads a record file and extracts its questions.
pub fn load_questions(path: &Path, field: &str) -> Result<QuestionBatch, AppError> {
    let records = load_records(path)?;
    let batch = extract_questions(&records, field);
    info!(
        path = %path.display(),
        records = batch.record_count,
        questions = batch.questions.len(),
        "Loaded question records"
    );
    Ok(batch)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array_and_wrapper() {
        let records = parse_records(r#"[{"Original Question": "a"}, {}]"#).unwrap();
        assert_eq!(records.len(), 2);

        let records = parse_records(r#"{"data": [{"Original Question": "a"}], "total": 1}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(parse_records("42"), Err(AppError::Validation(_))));
        assert!(matches!(parse_records(r#"{"rows": []}"#), Err(AppError::Validation(_))));
        assert!(matches!(parse_records("not json"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_extract_questions() {
        let records = vec![
            json!({"Original Question": "  How many depositions are there?  "}),
            json!({"Original Question": ""}),
            json!({"Original Question": null}),
            json!({"Original Question": 7}),
            json!({"Other": "ignored"}),
            json!({"Original Question": "List all depositions"}),
        ];
        let batch = extract_questions(&records, "Original Question");
        assert_eq!(
            batch.questions,
            vec!["How many depositions are there?", "List all depositions"]
        );
        assert_eq!(batch.record_count, 6);
    }
}
