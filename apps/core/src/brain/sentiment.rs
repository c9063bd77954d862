//! Sentiment bucketing.
//!
//! A [`SentimentScorer`] produces a compound polarity score in [-1.0, 1.0];
//! [`SentimentLabel::from_score`] maps it onto five bands. Bands are half-open
//! `[lower, upper)` except the top one, which is closed, so every score in
//! range lands in exactly one band.
//!
//! `LexiconScorer` is the built-in scorer: a valence lexicon with negation,
//! intensifiers, contrastive "but", capitalization and exclamation emphasis,
//! normalized as `x / sqrt(x² + 15)`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::brain::result::{AnalysisResult, LabelShare};
use crate::error::AppError;

/// Five-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    /// Labels from most negative to most positive.
    pub const ALL: [SentimentLabel; 5] = [
        SentimentLabel::VeryNegative,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::VeryPositive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "very_negative",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
            SentimentLabel::VeryPositive => "very_positive",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "😡",
            SentimentLabel::Negative => "😞",
            SentimentLabel::Neutral => "😐",
            SentimentLabel::Positive => "😊",
            SentimentLabel::VeryPositive => "😍",
        }
    }

    /// Parse a label produced by [`SentimentLabel::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.label() == label)
    }

    /// Bucket a compound score.
    ///
    /// Scores outside [-1.0, 1.0] are clamped first. Returns `None` for NaN.
    pub fn from_score(score: f64) -> Option<Self> {
        if score.is_nan() {
            return None;
        }
        let score = score.clamp(-1.0, 1.0);
        let last = SENTIMENT_BANDS.len() - 1;
        SENTIMENT_BANDS
            .iter()
            .enumerate()
            .find(|(i, band)| band.contains(score, *i == last))
            .map(|(_, band)| band.label)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One interval of the compound score range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentBand {
    pub label: SentimentLabel,
    pub lower: f64,
    pub upper: f64,
}

impl SentimentBand {
    fn contains(&self, score: f64, closed_above: bool) -> bool {
        score >= self.lower && (score < self.upper || (closed_above && score <= self.upper))
    }
}

/// The band table, ascending and contiguous over [-1.0, 1.0].
pub const SENTIMENT_BANDS: [SentimentBand; 5] = [
    SentimentBand {
        label: SentimentLabel::VeryNegative,
        lower: -1.0,
        upper: -0.5,
    },
    SentimentBand {
        label: SentimentLabel::Negative,
        lower: -0.5,
        upper: -0.1,
    },
    SentimentBand {
        label: SentimentLabel::Neutral,
        lower: -0.1,
        upper: 0.1,
    },
    SentimentBand {
        label: SentimentLabel::Positive,
        lower: 0.1,
        upper: 0.5,
    },
    SentimentBand {
        label: SentimentLabel::VeryPositive,
        lower: 0.5,
        upper: 1.0,
    },
];

/// Produces a compound polarity score for a piece of text.
pub trait SentimentScorer: Send + Sync {
    /// Score in [-1.0, 1.0]; negative is unfavourable.
    fn compound(&self, text: &str) -> Result<f64, AppError>;
}

/// A scored, bucketed question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredQuestion {
    pub score: f64,
    pub label: SentimentLabel,
}

/// Score and bucket one question. Blank questions yield `Ok(None)`.
pub fn score_question(
    scorer: &dyn SentimentScorer,
    question: &str,
) -> Result<Option<ScoredQuestion>, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Ok(None);
    }

    let score = scorer.compound(question)?;
    let label = SentimentLabel::from_score(score)
        .ok_or_else(|| AppError::Scoring(format!("scorer returned {} for '{}'", score, question)))?;

    Ok(Some(ScoredQuestion {
        score: score.clamp(-1.0, 1.0),
        label,
    }))
}

/// Distribution reported when no question could be scored: one count per label.
pub fn placeholder_distribution() -> AnalysisResult {
    let mut counts = AnalysisResult::new();
    for label in SentimentLabel::ALL {
        counts.increment(label.label());
    }
    counts
}

/// Percentages of a sentiment distribution, each share carrying its label's emoji.
pub fn shares_with_emoji(counts: &AnalysisResult) -> Vec<LabelShare> {
    counts
        .percentages()
        .into_iter()
        .map(|mut share| {
            share.emoji = SentimentLabel::from_label(&share.label).map(|l| l.emoji().to_string());
            share
        })
        .collect()
}

/// Summary statistics over the scored questions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub average: f64,
    pub most_positive: f64,
    pub most_negative: f64,
    pub scored: usize,
}

impl SentimentStats {
    /// `None` when there are no scores.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let sum: f64 = scores.iter().sum();
        let most_positive = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let most_negative = scores.iter().copied().fold(f64::INFINITY, f64::min);
        Some(Self {
            average: sum / scores.len() as f64,
            most_positive,
            most_negative,
            scored: scores.len(),
        })
    }
}

/// Texts longer than this are rejected rather than scored.
pub const MAX_SCORABLE_CHARS: usize = 20_000;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

/// Valence lexicon: `word mean-valence` on the range -4..4.
///
/// A compact subset of the VADER word list, weighted toward complaint and
/// legal-intake vocabulary. Words outside it carry no valence, so questions
/// built only from unlisted words score neutral.
const VALENCE_LEXICON: &str = "
love 3.2
loved 2.9
loves 2.7
lovely 2.8
amazing 2.8
awesome 3.1
great 3.1
good 1.9
best 3.2
better 1.9
excellent 2.7
wonderful 2.7
fantastic 2.6
perfect 2.7
nice 1.8
like 1.5
liked 1.8
happy 2.7
glad 2.0
pleased 1.9
thanks 1.9
thank 1.5
thankful 2.7
appreciate 1.7
appreciated 2.3
helpful 1.8
useful 1.9
easy 1.9
clear 1.6
fine 0.8
cool 1.3
fair 1.3
win 2.8
won 2.7
success 2.7
successful 2.8
resolved 0.7
settled 0.9
agree 1.5
yes 1.7
ok 1.2
okay 0.9
please 1.3
hope 1.9
bad -2.5
worse -2.1
worst -3.1
terrible -2.1
awful -2.0
horrible -2.5
hate -2.7
hated -3.2
dislike -1.6
disappointing -2.2
disappointed -1.9
angry -2.3
upset -1.6
frustrated -1.8
frustrating -1.9
annoying -1.7
annoyed -1.6
useless -1.8
broken -1.6
wrong -2.1
problem -1.7
problems -1.7
error -1.4
errors -1.4
fail -2.0
failed -2.3
failure -2.3
confusing -1.3
confused -1.3
stupid -2.4
sad -2.1
poor -2.1
pain -2.3
painful -1.9
hurt -2.4
injury -1.6
injured -1.7
accident -2.1
lost -1.3
lose -1.7
denied -1.3
deny -1.4
missing -1.2
late -0.6
delay -1.3
delayed -1.2
worried -1.2
worry -1.9
unfortunately -1.4
slow -0.9
waste -1.8
ridiculous -1.5
abandoned -2.1
abuse -3.2
afraid -2.2
aggressive -0.6
alarming -1.9
anxious -1.0
apologize 0.4
beautiful 2.9
benefit 2.0
blame -1.4
blamed -2.1
bother -1.6
brilliant 2.8
calm 1.3
careful 0.6
careless -1.5
cheated -2.3
comfortable 2.3
complain -1.5
complaint -1.2
confident 2.2
cruel -2.8
damage -2.2
damaged -1.9
danger -2.4
dangerous -2.1
dead -3.3
death -2.9
delighted 3.1
desperate -1.3
difficult -1.5
dissatisfied -1.6
distressed -1.8
effective 2.1
efficient 1.8
embarrassed -1.5
excited 2.4
exhausted -1.5
fault -1.7
fear -2.2
fearful -2.2
fight -1.6
fired -2.6
fraud -2.8
friendly 2.2
furious -2.7
generous 2.3
grateful 2.0
guilty -1.8
harm -2.5
harmed -2.1
helpless -2.0
honest 2.3
ignored -1.3
impressed 2.1
improve 1.9
improved 2.1
incorrect -1.2
insult -2.3
kind 2.4
kill -3.7
lawsuit -0.9
liar -3.1
lied -1.6
mess -1.5
mistake -1.4
negligent -1.5
nervous -1.1
outstanding 3.0
panic -2.3
pleasant 2.3
positive 2.6
refuse -1.2
refused -1.2
refusing -1.7
relief 2.1
relieved 1.5
reliable 2.1
rude -2.0
safe 1.9
satisfied 1.8
scared -1.9
shame -2.1
shocked -1.3
sick -2.3
stress -1.8
stressed -1.4
suffer -2.5
suffering -2.1
threat -2.4
threatened -2.0
tired -1.9
unfair -2.1
unhappy -1.8
victim -1.1
violent -2.9
welcome 2.0
worthless -1.9
";

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "hardly", "rarely", "seldom",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "completely", "deeply", "enormously", "entirely", "especially",
    "extremely", "fully", "greatly", "highly", "hugely", "incredibly", "intensely",
    "particularly", "purely", "quite", "really", "remarkably", "so", "substantially",
    "thoroughly", "totally", "tremendously", "truly", "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "less", "little", "marginally", "occasionally", "partly", "scarcely",
    "slightly", "somewhat",
];

/// Valence-lexicon sentiment scorer.
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    boosters: HashMap<&'static str, f64>,
}

static DEFAULT_SCORER: OnceLock<Option<Arc<LexiconScorer>>> = OnceLock::new();

/// The process-wide scorer, loaded on first use.
///
/// Returns `None` if the lexicon failed to load; the failure is logged once.
pub fn default_scorer() -> Option<Arc<LexiconScorer>> {
    DEFAULT_SCORER
        .get_or_init(|| {
            info!("Loading sentiment lexicon...");
            match LexiconScorer::load() {
                Ok(scorer) => Some(Arc::new(scorer)),
                Err(e) => {
                    warn!("Sentiment scorer unavailable: {}", e);
                    None
                }
            }
        })
        .clone()
}

impl LexiconScorer {
    /// Parses the embedded valence lexicon.
    pub fn load() -> Result<Self, AppError> {
        Self::from_lexicon(VALENCE_LEXICON)
    }

    /// Builds a scorer from `word valence` lines.
    pub fn from_lexicon(lexicon: &str) -> Result<Self, AppError> {
        let mut valences = HashMap::new();
        for (line_no, line) in lexicon.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line
                .split_once(char::is_whitespace)
                .and_then(|(word, value)| value.trim().parse::<f64>().ok().map(|v| (word, v)));
            match parsed {
                Some((word, valence)) if valence.is_finite() => {
                    valences.insert(word.to_lowercase(), valence);
                }
                _ => {
                    return Err(AppError::ScorerUnavailable(format!(
                        "malformed lexicon entry on line {}: '{}'",
                        line_no + 1,
                        line
                    )))
                }
            }
        }

        if valences.is_empty() {
            return Err(AppError::ScorerUnavailable("sentiment lexicon is empty".to_string()));
        }

        let boosters = BOOSTERS_UP
            .iter()
            .map(|w| (*w, BOOSTER_INCREMENT))
            .chain(BOOSTERS_DOWN.iter().map(|w| (*w, -BOOSTER_INCREMENT)))
            .collect();

        debug!(entries = valences.len(), "Sentiment lexicon loaded");
        Ok(Self { valences, boosters })
    }

    fn valence_at(&self, words: &[&str], lowered: &[String], i: usize, caps_differ: bool) -> f64 {
        let word = lowered[i].as_str();
        if self.boosters.contains_key(word) {
            return 0.0;
        }
        let Some(base) = self.valences.get(word).copied() else {
            return 0.0;
        };

        let mut valence = base;
        if caps_differ && is_shouting(words[i]) {
            valence += CAPS_INCREMENT * valence.signum();
        }

        for distance in 1..=3 {
            let Some(j) = i.checked_sub(distance) else {
                break;
            };
            if let Some(scalar) = self.boosters.get(lowered[j].as_str()) {
                let damping = match distance {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                valence += scalar * valence.signum() * damping;
            }
        }

        let window = &lowered[i.saturating_sub(3)..i];
        if window.iter().any(|w| is_negation(w)) {
            valence *= NEGATION_SCALAR;
        }

        valence
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> Result<f64, AppError> {
        let length = text.chars().count();
        if length > MAX_SCORABLE_CHARS {
            return Err(AppError::Scoring(format!(
                "text has {} characters, limit is {}",
                length, MAX_SCORABLE_CHARS
            )));
        }

        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .collect();
        let lowered: Vec<String> = words
            .iter()
            .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
            .collect();

        let shouting = words.iter().filter(|w| is_shouting(w)).count();
        let caps_differ = shouting > 0 && shouting < words.len();

        let mut valences: Vec<f64> = (0..words.len())
            .map(|i| self.valence_at(&words, &lowered, i, caps_differ))
            .collect();

        if let Some(pivot) = lowered.iter().position(|w| w == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            sum += punctuation_emphasis(text) * sum.signum();
        }

        Ok(normalize(sum))
    }
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn is_shouting(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(char::is_alphabetic)
        && word.chars().all(|c| !c.is_lowercase())
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * 0.18,
        _ => 0.96,
    };
    exclamations as f64 * EXCLAMATION_INCREMENT + question_emphasis
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
