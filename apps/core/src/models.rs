use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use validator::Validate;

use crate::brain::tagger::PosTag;
use crate::error::AppError;

/// Minimum token length used when the caller supplies none (or an unusable one).
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Upper bound accepted for `min_length`; longer settings are clamped down to it.
pub const MAX_MIN_LENGTH: usize = 64;

/// Settings for verb-only lexical extraction.
///
/// Keys serialize in camelCase (`includeBase`, `minLength`, ...). Unknown keys are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct VerbConfig {
    /// Base form (VB).
    pub include_base: bool,
    /// Past tense (VBD).
    pub include_past: bool,
    /// Gerund / present participle (VBG).
    pub include_gerund: bool,
    /// Past participle (VBN).
    pub include_past_participle: bool,
    /// Present tense, not third person singular (VBP).
    pub include_present_non3rd: bool,
    /// Present tense, third person singular (VBZ).
    pub include_present3rd: bool,
    /// Modal auxiliaries (MD).
    pub include_modals: bool,
    /// Words shorter than this many characters are dropped.
    #[validate(range(min = 1, max = 64))]
    pub min_length: usize,
    /// Accept words such as "don't" as long as they are alphabetic once apostrophes are removed.
    pub allow_contractions: bool,
    /// Use the full stop-word list instead of the short core list.
    pub strict_stop_words: bool,
    /// Extra words to drop, compared in lower case.
    pub custom_excludes: BTreeSet<String>,
}

impl Default for VerbConfig {
    fn default() -> Self {
        Self {
            include_base: true,
            include_past: true,
            include_gerund: true,
            include_past_participle: true,
            include_present_non3rd: true,
            include_present3rd: true,
            include_modals: false,
            min_length: DEFAULT_MIN_LENGTH,
            allow_contractions: false,
            strict_stop_words: true,
            custom_excludes: BTreeSet::new(),
        }
    }
}

impl VerbConfig {
    /// A configuration with every verb-form flag switched off.
    pub fn no_verb_forms() -> Self {
        Self {
            include_base: false,
            include_past: false,
            include_gerund: false,
            include_past_participle: false,
            include_present_non3rd: false,
            include_present3rd: false,
            include_modals: false,
            ..Self::default()
        }
    }

    /// The POS tags selected by the verb-form flags.
    pub fn enabled_tags(&self) -> Vec<PosTag> {
        [
            (self.include_base, PosTag::VerbBase),
            (self.include_past, PosTag::VerbPast),
            (self.include_gerund, PosTag::VerbGerund),
            (self.include_past_participle, PosTag::VerbPastParticiple),
            (self.include_present_non3rd, PosTag::VerbPresentNon3rd),
            (self.include_present3rd, PosTag::VerbPresent3rd),
            (self.include_modals, PosTag::Modal),
        ]
        .into_iter()
        .filter_map(|(enabled, tag)| enabled.then_some(tag))
        .collect()
    }

    /// Checks the settings against their documented ranges.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(|e| {
            AppError::MalformedConfig(format!("minLength={}: {}", self.min_length, e))
        })
    }

    /// Returns a copy that passes validation, clamping `min_length` when needed.
    pub fn sanitized(mut self) -> Self {
        if let Err(e) = self.check() {
            let clamped = if self.min_length == 0 {
                DEFAULT_MIN_LENGTH
            } else {
                MAX_MIN_LENGTH
            };
            warn!(min_length = self.min_length, clamped, "{}, clamping", e);
            self.min_length = clamped;
        }
        self.custom_excludes = self
            .custom_excludes
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    /// Builds a configuration from a loosely-typed settings object.
    ///
    /// Unrecognized keys are ignored; values of the wrong type keep the default.
    pub fn from_settings(settings: &Map<String, Value>) -> Self {
        let mut config = Self::default();

        for (key, value) in settings {
            let flag = match key.as_str() {
                "includeBase" => Some(&mut config.include_base),
                "includePast" => Some(&mut config.include_past),
                "includeGerund" => Some(&mut config.include_gerund),
                "includePastParticiple" => Some(&mut config.include_past_participle),
                "includePresentNon3rd" => Some(&mut config.include_present_non3rd),
                "includePresent3rd" => Some(&mut config.include_present3rd),
                "includeModals" => Some(&mut config.include_modals),
                "allowContractions" => Some(&mut config.allow_contractions),
                "strictStopWords" => Some(&mut config.strict_stop_words),
                _ => None,
            };

            if let Some(flag) = flag {
                match parse_bool(value) {
                    Some(b) => *flag = b,
                    None => warn!(key = %key, value = %value, "Ignoring non-boolean verb setting"),
                }
                continue;
            }

            match key.as_str() {
                "minLength" => config.min_length = parse_min_length(value),
                "customExcludes" => config.custom_excludes = parse_excludes(value),
                other => debug!(key = other, "Ignoring unrecognized verb setting"),
            }
        }

        config.sanitized()
    }

    /// Builds a configuration from `key=value` pairs such as `includeModals=true`.
    ///
    /// Leading dashes on keys are stripped; `true`/`false` become booleans and
    /// integers become numbers. Items without `=` are ignored.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Map::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let Some((key, value)) = pair.split_once('=') else {
                debug!(pair, "Ignoring verb setting without '='");
                continue;
            };
            let key = key.trim().trim_start_matches('-').to_string();
            let value = value.trim();
            let parsed = if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
                Value::Bool(value.eq_ignore_ascii_case("true"))
            } else if let Ok(n) = value.parse::<i64>() {
                Value::from(n)
            } else {
                Value::String(value.to_string())
            };
            settings.insert(key, parsed);
        }
        Self::from_settings(&settings)
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_min_length(value: &Value) -> usize {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(MAX_MIN_LENGTH),
        Some(n) => {
            warn!(min_length = n, "Non-positive minLength, using default {}", DEFAULT_MIN_LENGTH);
            DEFAULT_MIN_LENGTH
        }
        None => {
            warn!(value = %value, "Unparseable minLength, using default {}", DEFAULT_MIN_LENGTH);
            DEFAULT_MIN_LENGTH
        }
    }
}

fn parse_excludes(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => {
            warn!(value = %value, "Ignoring customExcludes that is neither a list nor a string");
            BTreeSet::new()
        }
    }
}

/// Which words the lexical frequency analysis keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LexicalMode {
    /// Every content word.
    #[default]
    All,
    /// Only words tagged as an enabled verb form.
    Verbs,
}

/// The analysis to run over a batch of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "mode", rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Word frequencies for a word cloud.
    Lexical(LexicalMode),
    /// Intent category counts.
    Intent,
    /// Sentiment bucket counts.
    Sentiment,
    /// Interrogative-word counts.
    QuestionWords,
}

impl AnalysisKind {
    /// The resolved mode string reported back to callers.
    pub fn mode_label(&self) -> &'static str {
        match self {
            AnalysisKind::Lexical(LexicalMode::All) => "all",
            AnalysisKind::Lexical(LexicalMode::Verbs) => "verbs",
            AnalysisKind::Intent => "question-types",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::QuestionWords => "question-words",
        }
    }

    /// Name of the stage, used in error messages.
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisKind::Lexical(_) => "lexical frequency",
            AnalysisKind::Intent => "intent classification",
            AnalysisKind::Sentiment => "sentiment bucketing",
            AnalysisKind::QuestionWords => "question-word breakdown",
        }
    }
}

/// One analysis request over a question collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub questions: Vec<String>,
    /// Number of upstream records the questions came from; defaults to `questions.len()`.
    #[serde(default)]
    pub record_count: Option<usize>,
    /// Verb settings; only read in verb mode.
    #[serde(default)]
    pub verb_config: Option<VerbConfig>,
}

impl AnalysisRequest {
    pub fn new(kind: AnalysisKind, questions: Vec<String>) -> Self {
        Self {
            kind,
            questions,
            record_count: None,
            verb_config: None,
        }
    }

    pub fn lexical(questions: Vec<String>, mode: LexicalMode) -> Self {
        Self::new(AnalysisKind::Lexical(mode), questions)
    }

    pub fn intents(questions: Vec<String>) -> Self {
        Self::new(AnalysisKind::Intent, questions)
    }

    pub fn sentiment(questions: Vec<String>) -> Self {
        Self::new(AnalysisKind::Sentiment, questions)
    }

    pub fn question_words(questions: Vec<String>) -> Self {
        Self::new(AnalysisKind::QuestionWords, questions)
    }

    pub fn with_verb_config(mut self, config: VerbConfig) -> Self {
        self.verb_config = Some(config);
        self
    }

    pub fn with_record_count(mut self, record_count: usize) -> Self {
        self.record_count = Some(record_count);
        self
    }

    /// The record count to report.
    pub fn resolved_record_count(&self) -> usize {
        self.record_count.unwrap_or(self.questions.len())
    }

    /// Verb settings to use, sanitized.
    pub fn resolved_verb_config(&self) -> VerbConfig {
        self.verb_config.clone().unwrap_or_default().sanitized()
    }
}
