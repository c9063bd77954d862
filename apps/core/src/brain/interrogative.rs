//! Question-word breakdown: labels a question by the first interrogative
//! family it contains, checked in a fixed order.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use crate::brain::normalizer::normalize_question;

/// Label for questions that contain none of the families.
pub const OTHER: &str = "Other";

const FAMILIES: &[(&str, &str)] = &[
    ("What", r"\bwhat\b"),
    ("How", r"\bhow\b"),
    ("Why", r"\bwhy\b"),
    ("When", r"\bwhen\b"),
    ("Where", r"\bwhere\b"),
    ("Who", r"\bwho\b"),
    ("Which", r"\bwhich\b"),
    ("Can/Could", r"\b(can|could)\b"),
    ("Should", r"\bshould\b"),
    ("Would", r"\bwould\b"),
    ("Is/Are", r"\b(is|are)\b"),
    ("Do/Does", r"\b(do|does|did)\b"),
    ("Will", r"\bwill\b"),
    ("Has/Have", r"\b(has|have|had)\b"),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FAMILIES
        .iter()
        .filter_map(|(label, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((*label, re)),
            Err(e) => {
                warn!(label, "Dropping invalid question-word pattern: {}", e);
                None
            }
        })
        .collect()
});

/// Family labels in evaluation order, followed by [`OTHER`].
pub fn labels() -> impl Iterator<Item = &'static str> {
    FAMILIES.iter().map(|(label, _)| *label).chain(std::iter::once(OTHER))
}

/// The question-word family of a question.
pub fn question_word(question: &str) -> &'static str {
    let question = normalize_question(question);
    COMPILED
        .iter()
        .find(|(_, re)| re.is_match(&question))
        .map(|(label, _)| *label)
        .unwrap_or(OTHER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        let cases = [
            ("What is the claim number?", "What"),
            ("HOW many depositions are there?", "How"),
            ("Why did the adjuster deny it?", "Why"),
            ("Where was the accident?", "Where"),
            ("Could you summarize the file", "Can/Could"),
            ("Is the client represented?", "Is/Are"),
            ("Did we file the motion?", "Do/Does"),
            ("Will the hearing move?", "Will"),
            ("Has the demand been sent?", "Has/Have"),
            ("Summarize the records", OTHER),
            ("", OTHER),
        ];
        for (q, expected) in cases {
            assert_eq!(question_word(q), expected, "Expected {} for '{}'", expected, q);
        }
    }

    #[test]
    fn test_order_decides_overlaps() {
        // Contains both "how" and "what"; "What" is checked first.
        assert_eq!(question_word("How is that what we wanted?"), "What");
        // "is" appears, but "should" comes earlier in the order.
        assert_eq!(question_word("Is it something we should do?"), "Should");
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(question_word("Somewhat unclear"), OTHER);
        assert_eq!(question_word("This showcase"), OTHER);
    }

    #[test]
    fn test_labels() {
        let all: Vec<&str> = labels().collect();
        assert_eq!(all.len(), FAMILIES.len() + 1);
        assert_eq!(all.first(), Some(&"What"));
        assert_eq!(all.last(), Some(&OTHER));
    }
}
