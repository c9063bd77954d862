//! Text normalization shared by every analyzer.
//!
//! Lower-cases raw question text and splits it into word tokens. A token is a
//! contiguous run of alphanumeric characters and apostrophes; everything else
//! (punctuation, whitespace, emoji) separates tokens and is discarded.

/// Lower-case and split text into word tokens.
///
/// Typographic apostrophes are folded to `'`, and apostrophes at the edges of
/// a token are dropped (`'quoted'` becomes `quoted`). Never fails; empty or
/// whitespace-only input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'");

    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|token| token.trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lower-cased, trimmed form of a question, as used by pattern matching.
pub fn normalize_question(question: &str) -> String {
    question.to_lowercase().trim().to_string()
}

/// Questions that still have content after trimming.
pub fn non_empty(questions: &[String]) -> impl Iterator<Item = &str> {
    questions.iter().map(|q| q.trim()).filter(|q| !q.is_empty())
}

/// Character count of a token (not its byte length).
pub fn char_len(token: &str) -> usize {
    token.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenization() {
        assert_eq!(
            tokenize("How many Depositions are there?"),
            vec!["how", "many", "depositions", "are", "there"]
        );
    }

    #[test]
    fn test_keeps_contractions() {
        assert_eq!(tokenize("It's what we don’t know"), vec!["it's", "what", "we", "don't", "know"]);
    }

    #[test]
    fn test_strips_edge_apostrophes() {
        assert_eq!(tokenize("'quoted' ''"), vec!["quoted"]);
    }

    #[test]
    fn test_empty_and_symbols() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert!(tokenize("?!... 😍 😡").is_empty());
    }

    #[test]
    fn test_digits_and_unicode() {
        assert_eq!(tokenize("Case 2024 café"), vec!["case", "2024", "café"]);
    }

    #[test]
    fn test_non_empty_filter() {
        let questions = vec!["  ".to_string(), " Hi ".to_string(), String::new()];
        let kept: Vec<&str> = non_empty(&questions).collect();
        assert_eq!(kept, vec!["Hi"]);
    }
}
