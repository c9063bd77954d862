//! Analysis output: label counts, the degradation marker and the report
//! handed to the rendering layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::sentiment::SentimentStats;
use crate::models::AnalysisKind;

/// Label → occurrence count. Labels are words, category names or sentiment labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(HashMap<String, usize>);

/// One label's count and its share of the total, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
    /// Display glyph, set for sentiment labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    pub fn add(&mut self, label: &str, count: usize) {
        if count == 0 {
            return;
        }
        match self.0.get_mut(label) {
            Some(existing) => *existing += count,
            None => {
                self.0.insert(label.to_string(), count);
            }
        }
    }

    /// Sum counts from `other` into `self`.
    pub fn merge(&mut self, other: AnalysisResult) {
        for (label, count) in other.0 {
            *self.0.entry(label).or_insert(0) += count;
        }
    }

    /// Count for a label; zero if absent.
    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Labels by descending count, ties broken alphabetically.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Shares of the total, rounded to one decimal, in `most_common` order.
    pub fn percentages(&self) -> Vec<LabelShare> {
        let total = self.total();
        self.most_common()
            .into_iter()
            .map(|(label, count)| LabelShare {
                label: label.to_string(),
                count,
                percentage: if total == 0 {
                    0.0
                } else {
                    (count as f64 * 1000.0 / total as f64).round() / 10.0
                },
                emoji: None,
            })
            .collect()
    }
}

impl FromIterator<String> for AnalysisResult {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut result = Self::new();
        for label in iter {
            result.increment(&label);
        }
        result
    }
}

/// Why a result is a best-effort substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    TaggerUnavailable(String),
    ScorerUnavailable(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::TaggerUnavailable(detail) => write!(f, "POS tagger unavailable: {}", detail),
            DegradeReason::ScorerUnavailable(detail) => {
                write!(f, "sentiment scorer unavailable: {}", detail)
            }
        }
    }
}

/// A genuine result, or a placeholder standing in for one.
///
/// Hard failures are reported separately as `Err(AppError)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { data: T, reason: DegradeReason },
}

impl<T> Outcome<T> {
    pub fn data(&self) -> &T {
        match self {
            Outcome::Complete(data) | Outcome::Degraded { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Outcome::Complete(data) | Outcome::Degraded { data, .. } => data,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Final output of one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,

    pub analysis: AnalysisKind,

    /// Resolved mode label (`all`, `verbs`, `question-types`, ...)
    pub mode: String,

    /// Number of upstream records the questions came from
    pub record_count: usize,

    /// Questions that contributed to `counts`
    pub analyzed_count: usize,

    /// Questions dropped after a per-question failure
    pub skipped_count: usize,

    pub counts: AnalysisResult,

    /// `counts` as shares of the total, largest first
    pub percentages: Vec<LabelShare>,

    /// Set when `counts` is a placeholder or best-effort substitute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradeReason>,

    /// Score statistics, for sentiment requests with at least one scored question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentStats>,

    pub processing_time_ms: u64,

    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// The counts, tagged with whether they are genuine.
    pub fn outcome(&self) -> Outcome<AnalysisResult> {
        match &self.degraded {
            None => Outcome::Complete(self.counts.clone()),
            Some(reason) => Outcome::Degraded {
                data: self.counts.clone(),
                reason: reason.clone(),
            },
        }
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        let top = self
            .counts
            .most_common()
            .into_iter()
            .take(3)
            .map(|(label, count)| format!("{}={}", label, count))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Mode: {}, Records: {}, Analyzed: {}, Skipped: {}, Labels: {}, Top: [{}]{}",
            self.mode,
            self.record_count,
            self.analyzed_count,
            self.skipped_count,
            self.counts.len(),
            top,
            match &self.degraded {
                Some(reason) => format!(", Degraded: {}", reason),
                None => String::new(),
            }
        )
    }
}
