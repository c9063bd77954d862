//! Intent classification over an ordered category table.
//!
//! Each question gets exactly one category. Categories are tried in table
//! order and, within a category, patterns in declared order; the first
//! surviving match wins. LOOKUP carries an exclusion list of bulk/plural
//! indicators that vetoes its matches. When nothing matches, questions ending
//! in `?` are NEEDS_CLARIFICATION and everything else is CONVERSATION.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

use crate::brain::normalizer::normalize_question;

/// Intent category assigned to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// "How many witnesses?"
    Aggregate,
    /// "Are there any depositions?"
    Exists,
    /// "List all medications"
    Extract,
    Summarize,
    Status,
    Calendar,
    Draft,
    Reason,
    /// A single fact about one entity ("Who is the adjuster?")
    Lookup,
    /// Greetings, thanks and small talk
    Conversation,
    Help,
    /// Questions about the assistant itself
    Meta,
    GeneralKb,
    /// Prompt-injection attempts
    Flagged,
    NeedsClarification,
    UnsupportedAction,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Aggregate,
        Category::Exists,
        Category::Extract,
        Category::Summarize,
        Category::Status,
        Category::Calendar,
        Category::Draft,
        Category::Reason,
        Category::Lookup,
        Category::Conversation,
        Category::Help,
        Category::Meta,
        Category::GeneralKb,
        Category::Flagged,
        Category::NeedsClarification,
        Category::UnsupportedAction,
    ];

    /// Label used in result counts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Exists => "EXISTS",
            Category::Extract => "EXTRACT",
            Category::Aggregate => "AGGREGATE",
            Category::Summarize => "SUMMARIZE",
            Category::Status => "STATUS",
            Category::Calendar => "CALENDAR",
            Category::Draft => "DRAFT",
            Category::Reason => "REASON",
            Category::Lookup => "LOOKUP",
            Category::Conversation => "CONVERSATION",
            Category::Help => "HELP",
            Category::Meta => "META",
            Category::GeneralKb => "GENERAL_KB",
            Category::Flagged => "FLAGGED",
            Category::NeedsClarification => "NEEDS_CLARIFICATION",
            Category::UnsupportedAction => "UNSUPPORTED_ACTION",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Static description of one category rule.
struct RuleSpec {
    category: Category,
    patterns: &'static [&'static str],
    /// Words whose presence discards a match of this category.
    exclusions: &'static [&'static str],
}

/// The rule table, in evaluation order.
///
/// AGGREGATE sits ahead of EXISTS so that "how many ... are there?" counts
/// instead of testing for existence.
const RULE_TABLE: &[RuleSpec] = &[
    RuleSpec {
        category: Category::Aggregate,
        patterns: &[
            r"\bhow\s+many\b",
            r"\btotal\b",
            r"\bcount\b",
            r"\baverage\b",
            r"\bsum\b",
            r"\bnumber\s+of\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Exists,
        patterns: &[
            r"\bany\s+\w*\?",
            r"\bdo\s+we\s+have\b",
            r"\bis\s+there\b",
            r"\bare\s+there\b",
            r"\bexist\b",
            // "Depositions?"
            r"^\w+s\s*\?$",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Extract,
        patterns: &[
            r"\blist\s+all\b",
            r"\bwhat\s+\w*\s+was\s+.*\s+on\b",
            r"\bshow\s+me\s+all\b",
            r"\blist\s+.*\s+(depositions|injuries|medications|records)\b",
            r"\bevery\s+\w+",
            r"\ball\s+(the\s+)?\w+",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Summarize,
        patterns: &[
            r"\bsummarize\b",
            r"\btell\s+me\s+about\b",
            r"\bwhat\s+happened\b",
            r"\boverview\b",
            r"\bexplain\b",
            r"\bdescribe\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Status,
        patterns: &[
            r"\bwhat.*left\s+to\s+do\b",
            r"\bstatus\b",
            r"\bprogress\b",
            r"\bmissing\b",
            r"\bnext\s+steps\b",
            r"\bwhat.*last\s+happened\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Calendar,
        patterns: &[
            r"\bwhen\s+is\s+.*deadline\b",
            r"\bdeadline\b",
            r"\bschedule\b",
            r"\bdate\b",
            r"\bwhen\s+(is|was|will)\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Draft,
        patterns: &[
            r"\bwrite\s+a\b",
            r"\bdraft\b",
            r"\bgenerate\b",
            r"\bcreate\s+a\s+(letter|document|report)\b",
            r"\bcompose\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Reason,
        patterns: &[
            r"\bshould\s+we\b",
            r"\bred\s+flags\b",
            r"\binconsistencies\b",
            r"\bhow\s+is\s+.*related\s+to\b",
            r"\bwhy\s+(should|would|did)\b",
            r"\bstrateg\w*\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Lookup,
        patterns: &[
            r"\bwho\s+is\s+the\s+\w+\?",
            r"\bwhat\s+is\s+the\s+\w+\s+(number|id)\b",
            // A bare entity name: "Adjuster?"
            r"^\s*(adjuster|attorney|client|claimant|defendant|plaintiff|doctor|judge|insurer|carrier|venue|policy|employer|address|phone|email|dob|ssn|claim|case)\s*\?\s*$",
        ],
        exclusions: &[
            "witnesses",
            "records",
            "depositions",
            "medications",
            "all",
            "every",
            "list",
            "show",
            "give me",
        ],
    },
    RuleSpec {
        category: Category::Conversation,
        patterns: &[
            r"\b(hi|hello|hey|thanks|thank\s+you|goodbye|bye)\b",
            r"\bhow\s+are\s+you\b",
            r"\bgood\s+(morning|afternoon|evening)\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Help,
        patterns: &[
            r"\bhow\s+to\b",
            r"\bfilevine\b",
            r"\bhelp\b",
            r"\binstructions\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Meta,
        patterns: &[
            r"\bcan\s+you\s+(read|access|see)\b",
            r"\bwhy\s+did\s+you\s+say\b",
            r"\bthat.*wrong\b",
            r"\bperformance\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::GeneralKb,
        patterns: &[r"\bwhat\s+is\s+(the\s+)?\w+\s*\?", r"\bdefin\w*\b"],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::Flagged,
        patterns: &[
            r"\bignore\s+all\s+previous\s+instruction\b",
            r"\bsystem\s+prompt\b",
            r"\badministrator\s+mode\b",
        ],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::NeedsClarification,
        patterns: &[r"^\s*\?\s*$", r"^.{1,5}$"],
        exclusions: &[],
    },
    RuleSpec {
        category: Category::UnsupportedAction,
        patterns: &[
            r"\b(change|update|set|assign|mark\s+as|delete)\b",
            r"\bmodify\b",
            r"\bedit\b",
        ],
        exclusions: &[],
    },
];

/// A compiled category rule.
pub struct CategoryRule {
    pub category: Category,
    patterns: Vec<Regex>,
    exclusions: &'static [&'static str],
}

impl CategoryRule {
    fn compile(entry: &RuleSpec) -> Self {
        let patterns = entry
            .patterns
            .iter()
            .filter_map(|p| compile_pattern(entry.category, p))
            .collect();

        Self {
            category: entry.category,
            patterns,
            exclusions: entry.exclusions,
        }
    }

    /// Patterns in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Lower-case indicators that veto this rule's matches.
    pub fn exclusions(&self) -> &[&'static str] {
        self.exclusions
    }

    /// True if an exclusion indicator occurs anywhere in the normalized
    /// question, including inside a longer word ("caller" holds "all").
    pub fn is_vetoed(&self, question: &str) -> bool {
        self.exclusions.iter().any(|ind| question.contains(ind))
    }

    /// First pattern that matches and is not vetoed.
    fn first_match(&self, question: &str) -> Option<&Regex> {
        self.patterns
            .iter()
            .filter(|re| re.is_match(question))
            .find(|_| !self.is_vetoed(question))
    }
}

fn compile_pattern(category: Category, pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("(?i){}", pattern)) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(category = %category, pattern, "Dropping invalid intent pattern: {}", e);
            None
        }
    }
}

static RULES: LazyLock<Vec<CategoryRule>> =
    LazyLock::new(|| RULE_TABLE.iter().map(CategoryRule::compile).collect());

/// Result of intent classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub category: Category,
    /// The pattern that decided the category, if one did.
    pub matched_pattern: Option<String>,
    /// True when no pattern matched and the fallback rule applied.
    pub fallback: bool,
}

/// Ordered-table intent classifier.
pub struct IntentClassifier {
    rules: &'static [CategoryRule],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            rules: RULES.as_slice(),
        }
    }

    /// The compiled table, in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        self.rules
    }

    /// Classify one question.
    pub fn classify(&self, question: &str) -> IntentResult {
        let question = normalize_question(question);

        for rule in self.rules {
            if let Some(pattern) = rule.first_match(&question) {
                return IntentResult {
                    category: rule.category,
                    matched_pattern: Some(pattern.as_str().to_string()),
                    fallback: false,
                };
            }
        }

        let category = if question.ends_with('?') {
            Category::NeedsClarification
        } else {
            Category::Conversation
        };

        IntentResult {
            category,
            matched_pattern: None,
            fallback: true,
        }
    }
}

/// Convenience wrapper returning only the category.
pub fn classify(question: &str) -> Category {
    IntentClassifier::new().classify(question).category
}
