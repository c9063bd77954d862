//! Lexical extraction for word-frequency analysis.
//!
//! Two modes: general mode keeps every content word, verb mode keeps only
//! words whose part-of-speech tag is one of the verb forms enabled in a
//! [`VerbConfig`]. Both return lower-cased words in input order, duplicates
//! included.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::brain::normalizer::{char_len, tokenize};
use crate::brain::tagger::PosTagger;
use crate::error::AppError;
use crate::models::VerbConfig;

/// Full stop-word set, used by general mode and by verb mode when strict.
pub const STOP_WORDS_STRICT: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this", "but",
    "they", "have", "had", "what", "said", "each", "which", "she", "do", "how", "their", "if",
    "up", "out", "many", "then", "them", "these", "so", "some", "her", "would", "make", "like",
    "into", "him", "time", "two", "more", "very", "when", "come", "may", "see", "use", "no",
    "way", "could", "my", "than", "first", "been", "call", "who", "oil", "sit", "now", "find",
    "down", "day", "did", "get", "made", "over", "where", "much", "your", "well", "water",
];

/// Short core stop-word set, used by verb mode when strictness is off.
pub const STOP_WORDS_RELAXED: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this", "but",
    "they", "have", "had", "what", "said", "each", "which", "she", "do", "how", "their", "if",
    "up", "out", "many", "then", "them", "these", "so",
];

static STRICT: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS_STRICT.iter().copied().collect());

static RELAXED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS_RELAXED.iter().copied().collect());

/// Check if a (lower-cased) word is a stop word.
pub fn is_stop_word(word: &str, strict: bool) -> bool {
    if strict {
        STRICT.contains(word)
    } else {
        RELAXED.contains(word)
    }
}

/// General mode: words longer than two characters, made only of letters,
/// and not in the strict stop-word set.
pub fn extract_general(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|word| {
            char_len(word) > 2
                && word.chars().all(char::is_alphabetic)
                && !is_stop_word(word, true)
        })
        .collect()
}

/// Verb mode: words tagged with an enabled verb form that also pass the
/// configured length, stop-word, exclusion and contraction filters.
///
/// With no verb form enabled the tagger is not consulted and the result is
/// empty. A tagger error is returned to the caller, which decides whether to
/// skip the text.
pub fn extract_verbs(
    text: &str,
    config: &VerbConfig,
    tagger: &dyn PosTagger,
) -> Result<Vec<String>, AppError> {
    let enabled = config.enabled_tags();
    if enabled.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let tagged = tagger.tag(&tokens)?;
    Ok(tagged
        .into_iter()
        .filter(|t| enabled.contains(&t.tag) && passes_verb_filters(&t.word, config))
        .map(|t| t.word.to_lowercase())
        .collect())
}

fn passes_verb_filters(word: &str, config: &VerbConfig) -> bool {
    if char_len(word) < config.min_length {
        return false;
    }
    if is_stop_word(word, config.strict_stop_words) || config.custom_excludes.contains(word) {
        return false;
    }
    if word.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if config.allow_contractions {
        let stripped: String = word.chars().filter(|c| *c != '\'').collect();
        !stripped.is_empty() && stripped.chars().all(char::is_alphabetic)
    } else {
        word.chars().all(char::is_alphabetic)
    }
}
