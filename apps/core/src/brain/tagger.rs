//! Part-of-speech tagging for verb extraction.
//!
//! `PosTagger` is the seam: anything that maps a token sequence to Penn
//! Treebank style tags can drive verb-only extraction. `LexiconTagger` is the
//! built-in implementation: closed-class word lists, an irregular verb table,
//! a list of regular verbs with generated inflections, suffix rules for
//! unknown words and a small amount of left-context disambiguation
//! ("the list" is a noun, "to list" is a verb).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Inputs longer than this are rejected instead of tagged.
pub const MAX_TAGGABLE_TOKENS: usize = 5_000;

/// Part-of-speech tag (Penn Treebank subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// VB
    VerbBase,
    /// VBD
    VerbPast,
    /// VBG
    VerbGerund,
    /// VBN
    VerbPastParticiple,
    /// VBP
    VerbPresentNon3rd,
    /// VBZ
    VerbPresent3rd,
    /// MD
    Modal,
    Noun,
    PluralNoun,
    Pronoun,
    PossessivePronoun,
    Determiner,
    Preposition,
    To,
    Conjunction,
    Adjective,
    Adverb,
    WhWord,
    Number,
    Existential,
    Interjection,
}

impl PosTag {
    /// Penn Treebank code for the tag.
    pub fn penn(&self) -> &'static str {
        match self {
            PosTag::VerbBase => "VB",
            PosTag::VerbPast => "VBD",
            PosTag::VerbGerund => "VBG",
            PosTag::VerbPastParticiple => "VBN",
            PosTag::VerbPresentNon3rd => "VBP",
            PosTag::VerbPresent3rd => "VBZ",
            PosTag::Modal => "MD",
            PosTag::Noun => "NN",
            PosTag::PluralNoun => "NNS",
            PosTag::Pronoun => "PRP",
            PosTag::PossessivePronoun => "PRP$",
            PosTag::Determiner => "DT",
            PosTag::Preposition => "IN",
            PosTag::To => "TO",
            PosTag::Conjunction => "CC",
            PosTag::Adjective => "JJ",
            PosTag::Adverb => "RB",
            PosTag::WhWord => "WRB",
            PosTag::Number => "CD",
            PosTag::Existential => "EX",
            PosTag::Interjection => "UH",
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.penn())
    }
}

/// A token paired with its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: PosTag,
}

/// Assigns one tag per token.
pub trait PosTagger: Send + Sync {
    /// Tags a token sequence. The output has the same length and order as the input.
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>, AppError>;
}

/// Irregular verbs: base, past, past participle.
const IRREGULAR_VERBS: &str = "
arise arose arisen
become became become
begin began begun
break broke broken
bring brought brought
build built built
buy bought bought
catch caught caught
choose chose chosen
come came come
cut cut cut
deal dealt dealt
draw drew drawn
drive drove driven
eat ate eaten
fall fell fallen
feel felt felt
fight fought fought
find found found
forget forgot forgotten
get got gotten
give gave given
go went gone
grow grew grown
hear heard heard
hide hid hidden
hit hit hit
hold held held
hurt hurt hurt
keep kept kept
know knew known
lay laid laid
lead led led
leave left left
lend lent lent
let let let
lose lost lost
make made made
mean meant meant
meet met met
pay paid paid
put put put
quit quit quit
read read read
ride rode ridden
ring rang rung
rise rose risen
run ran run
say said said
see saw seen
seek sought sought
sell sold sold
send sent sent
set set set
shake shook shaken
show showed shown
shut shut shut
sit sat sat
sleep slept slept
speak spoke spoken
spend spent spent
stand stood stood
steal stole stolen
strike struck struck
swear swore sworn
take took taken
teach taught taught
tell told told
think thought thought
throw threw thrown
understand understood understood
wake woke woken
wear wore worn
win won won
withdraw withdrew withdrawn
write wrote written
";

/// Regular verbs; third person, past and gerund forms are generated.
const REGULAR_VERBS: &str = "
access add agree allow answer appeal appear apply approve argue arrange ask assign
assist attach attend avoid believe call cancel change check claim clarify close
collect compare compile complete compose confirm consider contact contain continue
count create decide decline define delete deliver deny depose describe determine
draft edit email end enter establish evaluate exist expect explain export extract
file fill finish fix follow generate help identify ignore include indicate inform
injure involve list look love mark mention miss modify move need note notify
object obtain occur open order organize outline owe pass plan prefer prepare
present prevent print process produce provide receive recommend record refer
reject release remember remove rename reply report request require resolve
respond review schedule search serve settle share sign start state stop submit
suggest summarize supply suppose sue testify thank treat try update upload use
verify view visit wait want witness work
";

const MODALS: &[&str] = &[
    "can", "could", "may", "might", "must", "shall", "should", "will", "would", "ought",
];

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "each", "every", "all", "some", "any",
    "no", "another", "both", "either", "neither",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "myself",
    "yourself", "himself", "herself", "itself", "ourselves", "themselves", "someone", "anyone",
    "everyone", "something", "anything", "everything", "nothing", "one",
];

const POSSESSIVES: &[&str] = &["my", "your", "his", "its", "our", "their"];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "from", "up", "down", "out",
    "off", "over", "under", "since", "until", "within", "without", "across", "along", "around",
    "among", "per", "via", "than", "upon", "toward", "towards", "regarding", "including",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "because", "while", "although", "though",
    "whether", "unless",
];

const WH_WORDS: &[&str] = &["what", "who", "whom", "whose", "which", "when", "where", "why", "how"];

const ADVERBS: &[&str] = &[
    "not", "never", "also", "very", "just", "only", "too", "really", "still", "already", "now",
    "then", "here", "again", "always", "often", "ever", "soon", "even", "much", "more", "most",
    "less", "least", "quite", "rather", "yet", "please", "currently", "recently",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "new", "old", "last", "next", "first", "other", "same", "different", "many",
    "few", "several", "own", "sure", "able", "possible", "available", "important", "total",
    "current", "previous", "recent", "wrong", "right", "red", "main", "full", "late", "early",
];

const NUMBER_WORDS: &[&str] = &[
    "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "hundred", "thousand",
];

const INTERJECTIONS: &[&str] = &["hi", "hello", "hey", "thanks", "ok", "okay", "bye", "goodbye", "yes"];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical", "ary"];

/// How a surface form relates to its verb lemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerbForm {
    Base,
    Third,
    Past,
    Participle,
    PastOrParticiple,
    Gerund,
}

fn add_lemma(forms: &mut HashMap<String, VerbForm>, base: &str) {
    forms.entry(base.to_string()).or_insert(VerbForm::Base);
    forms.entry(third_person(base)).or_insert(VerbForm::Third);
    forms.entry(gerund(base)).or_insert(VerbForm::Gerund);
}

/// Rule- and lexicon-based tagger.
pub struct LexiconTagger {
    closed: HashMap<&'static str, PosTag>,
    verb_forms: HashMap<String, VerbForm>,
}

static DEFAULT_TAGGER: OnceLock<Option<Arc<LexiconTagger>>> = OnceLock::new();

/// The process-wide tagger, loaded on first use.
///
/// Returns `None` if the lexicon failed to load; the failure is logged once.
pub fn default_tagger() -> Option<Arc<LexiconTagger>> {
    DEFAULT_TAGGER
        .get_or_init(|| {
            info!("Loading POS tagger lexicon...");
            match LexiconTagger::load() {
                Ok(tagger) => Some(Arc::new(tagger)),
                Err(e) => {
                    warn!("POS tagger unavailable: {}", e);
                    None
                }
            }
        })
        .clone()
}

impl LexiconTagger {
    /// Parses the embedded lexicon tables.
    pub fn load() -> Result<Self, AppError> {
        Self::from_tables(IRREGULAR_VERBS, REGULAR_VERBS)
    }

    /// Builds a tagger from an irregular verb table (`base past participle` per
    /// line) and a whitespace-separated list of regular verbs.
    pub fn from_tables(irregular: &str, regular: &str) -> Result<Self, AppError> {
        let mut closed = HashMap::new();
        let groups: [(&[&str], PosTag); 11] = [
            (DETERMINERS, PosTag::Determiner),
            (PRONOUNS, PosTag::Pronoun),
            (POSSESSIVES, PosTag::PossessivePronoun),
            (PREPOSITIONS, PosTag::Preposition),
            (CONJUNCTIONS, PosTag::Conjunction),
            (WH_WORDS, PosTag::WhWord),
            (ADVERBS, PosTag::Adverb),
            (ADJECTIVES, PosTag::Adjective),
            (NUMBER_WORDS, PosTag::Number),
            (INTERJECTIONS, PosTag::Interjection),
            (MODALS, PosTag::Modal),
        ];
        for (words, tag) in groups {
            for word in words {
                closed.entry(*word).or_insert(tag);
            }
        }

        let mut verb_forms = HashMap::new();

        for (line_no, line) in irregular.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [base, past, participle] = parts.as_slice() else {
                return Err(AppError::TaggerUnavailable(format!(
                    "malformed irregular verb entry on line {}: '{}'",
                    line_no + 1,
                    line
                )));
            };
            add_lemma(&mut verb_forms, base);
            let past_form = if past == participle {
                VerbForm::PastOrParticiple
            } else {
                VerbForm::Past
            };
            verb_forms.entry(past.to_string()).or_insert(past_form);
            verb_forms
                .entry(participle.to_string())
                .or_insert(VerbForm::Participle);
        }

        for base in regular.split_whitespace() {
            if !base.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(AppError::TaggerUnavailable(format!(
                    "malformed regular verb entry: '{}'",
                    base
                )));
            }
            add_lemma(&mut verb_forms, base);
            verb_forms
                .entry(past_tense(base))
                .or_insert(VerbForm::PastOrParticiple);
        }

        if verb_forms.is_empty() {
            return Err(AppError::TaggerUnavailable("verb lexicon is empty".to_string()));
        }

        debug!(
            closed = closed.len(),
            verb_forms = verb_forms.len(),
            "POS tagger lexicon loaded"
        );

        Ok(Self { closed, verb_forms })
    }

    fn tag_one(&self, tokens: &[String], tags: &[PosTag], i: usize) -> PosTag {
        let word = tokens[i].as_str();
        let prev = tags.last().copied();
        let next = tokens.get(i + 1).map(String::as_str);
        let recent = &tokens[i.saturating_sub(3)..i];

        if word.chars().all(|c| c.is_numeric()) {
            return PosTag::Number;
        }
        if word.contains('\'') {
            return tag_contraction(word);
        }
        if let Some(tag) = tag_auxiliary(word, prev, recent) {
            return tag;
        }
        match word {
            "to" => return PosTag::To,
            "there" => {
                let beside_be = next.is_some_and(is_be_form)
                    || recent.last().is_some_and(|w| is_be_form(w));
                return if beside_be {
                    PosTag::Existential
                } else {
                    PosTag::Adverb
                }
            }
            _ => {}
        }
        if let Some(tag) = self.closed.get(word) {
            return *tag;
        }
        if let Some(form) = self.verb_forms.get(word) {
            return resolve_verb(*form, prev, recent);
        }
        tag_unknown(word, prev, recent)
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>, AppError> {
        if tokens.len() > MAX_TAGGABLE_TOKENS {
            return Err(AppError::Tagging(format!(
                "input has {} tokens, limit is {}",
                tokens.len(),
                MAX_TAGGABLE_TOKENS
            )));
        }

        let mut tags: Vec<PosTag> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let tag = self.tag_one(tokens, &tags, i);
            tags.push(tag);
        }

        Ok(tokens
            .iter()
            .zip(tags)
            .map(|(word, tag)| TaggedToken {
                word: word.clone(),
                tag,
            })
            .collect())
    }
}

fn is_be_form(word: &str) -> bool {
    matches!(
        word,
        "be" | "am" | "is" | "are" | "was" | "were" | "been" | "being" | "isn't" | "aren't" | "wasn't" | "weren't"
    )
}

fn is_have_form(word: &str) -> bool {
    matches!(
        word,
        "have" | "has" | "had" | "having" | "haven't" | "hasn't" | "hadn't" | "i've" | "we've" | "you've" | "they've"
    )
}

fn is_do_form(word: &str) -> bool {
    matches!(
        word,
        "do" | "does" | "did" | "don't" | "doesn't" | "didn't"
    )
}

/// Tags for be/have/do, which depend on context more than other verbs.
fn tag_auxiliary(word: &str, prev: Option<PosTag>, recent: &[String]) -> Option<PosTag> {
    let after_infinitive_marker = matches!(prev, Some(PosTag::Modal | PosTag::To));
    let tag = match word {
        "be" => PosTag::VerbBase,
        "am" | "are" => PosTag::VerbPresentNon3rd,
        "is" => PosTag::VerbPresent3rd,
        "was" | "were" => PosTag::VerbPast,
        "been" => PosTag::VerbPastParticiple,
        "being" | "having" | "doing" => PosTag::VerbGerund,
        "have" | "do" if after_infinitive_marker => PosTag::VerbBase,
        "have" | "do" => PosTag::VerbPresentNon3rd,
        "has" | "does" => PosTag::VerbPresent3rd,
        "had" if recent.iter().any(|w| is_have_form(w)) => PosTag::VerbPastParticiple,
        "had" | "did" => PosTag::VerbPast,
        "done" => PosTag::VerbPastParticiple,
        _ => return None,
    };
    Some(tag)
}

/// Contractions are kept as single tokens; tag them by their verb part.
fn tag_contraction(word: &str) -> PosTag {
    if let Some(stem) = word.strip_suffix("n't") {
        return match stem {
            "do" | "have" | "are" => PosTag::VerbPresentNon3rd,
            "does" | "has" | "is" => PosTag::VerbPresent3rd,
            "did" | "had" | "was" | "were" => PosTag::VerbPast,
            _ => PosTag::Modal,
        };
    }
    if word == "let's" {
        return PosTag::VerbBase;
    }
    PosTag::Pronoun
}

fn resolve_verb(form: VerbForm, prev: Option<PosTag>, recent: &[String]) -> PosTag {
    let after_have = recent.iter().any(|w| is_have_form(w));
    let after_be = recent.iter().any(|w| is_be_form(w));
    let after_do = recent.iter().any(|w| is_do_form(w));
    let after_modal = recent.iter().any(|w| MODALS.contains(&w.as_str()));
    let nominal_context = matches!(
        prev,
        Some(PosTag::Determiner | PosTag::PossessivePronoun | PosTag::Adjective | PosTag::Number)
    );

    match form {
        VerbForm::Base => match prev {
            Some(PosTag::Modal | PosTag::To) => PosTag::VerbBase,
            _ if after_have && recent.last().is_some_and(|w| is_have_form(w)) => {
                PosTag::VerbPastParticiple
            }
            _ if nominal_context => PosTag::Noun,
            Some(PosTag::Preposition) => PosTag::Noun,
            Some(PosTag::Pronoun | PosTag::PluralNoun) if !after_do && !after_modal => {
                PosTag::VerbPresentNon3rd
            }
            Some(PosTag::Noun) if !after_do => PosTag::Noun,
            _ => PosTag::VerbBase,
        },
        VerbForm::Third => {
            if nominal_context || matches!(prev, Some(PosTag::Preposition)) {
                PosTag::PluralNoun
            } else {
                PosTag::VerbPresent3rd
            }
        }
        VerbForm::Past => {
            if after_have {
                PosTag::VerbPastParticiple
            } else {
                PosTag::VerbPast
            }
        }
        VerbForm::Participle => PosTag::VerbPastParticiple,
        VerbForm::PastOrParticiple => {
            if after_have || after_be {
                PosTag::VerbPastParticiple
            } else if nominal_context {
                PosTag::Adjective
            } else {
                PosTag::VerbPast
            }
        }
        VerbForm::Gerund => {
            if nominal_context {
                PosTag::Noun
            } else {
                PosTag::VerbGerund
            }
        }
    }
}

fn tag_unknown(word: &str, prev: Option<PosTag>, recent: &[String]) -> PosTag {
    let len = word.chars().count();

    if matches!(prev, Some(PosTag::Modal | PosTag::To)) {
        return PosTag::VerbBase;
    }
    if len > 4 && word.ends_with("ing") {
        return resolve_verb(VerbForm::Gerund, prev, recent);
    }
    if len > 3 && word.ends_with("ed") {
        return resolve_verb(VerbForm::PastOrParticiple, prev, recent);
    }
    if len > 3 && word.ends_with("ly") {
        return PosTag::Adverb;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| len > s.len() + 2 && word.ends_with(*s)) {
        return PosTag::Adjective;
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return PosTag::PluralNoun;
    }
    PosTag::Noun
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    matches!((rev.next(), rev.next()), (Some('y'), Some(c)) if !"aeiou".contains(c))
}

fn third_person(base: &str) -> String {
    if ends_with_consonant_y(base) {
        format!("{}ies", &base[..base.len() - 1])
    } else if ["s", "x", "z", "ch", "sh", "o"].iter().any(|s| base.ends_with(*s)) {
        format!("{}es", base)
    } else {
        format!("{}s", base)
    }
}

fn past_tense(base: &str) -> String {
    if ends_with_consonant_y(base) {
        format!("{}ied", &base[..base.len() - 1])
    } else if base.ends_with('e') {
        format!("{}d", base)
    } else if ["stop", "plan", "submit", "omit", "admit", "commit", "refer", "prefer", "occur", "drop"]
        .contains(&base)
    {
        let last = &base[base.len() - 1..];
        format!("{}{}ed", base, last)
    } else {
        format!("{}ed", base)
    }
}

fn gerund(base: &str) -> String {
    if let Some(stem) = base.strip_suffix("ie") {
        format!("{}ying", stem)
    } else if base.ends_with('e') && !base.ends_with("ee") && base.len() > 2 {
        format!("{}ing", &base[..base.len() - 1])
    } else if ["stop", "plan", "submit", "omit", "admit", "commit", "refer", "prefer", "occur", "drop", "run", "sit", "get", "put", "cut", "hit", "set", "let", "win", "begin", "swim", "shut", "quit"]
        .contains(&base)
    {
        let last = &base[base.len() - 1..];
        format!("{}{}ing", base, last)
    } else {
        format!("{}ing", base)
    }
}
