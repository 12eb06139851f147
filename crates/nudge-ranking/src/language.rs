//! Target-language gate.
//!
//! A declared tag is authoritative: it is either accepted or rejected, with no
//! fallback to the text heuristic. Only shows without any tag are classified
//! from their name and description.

/// Outcome of language detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageClassification {
    Unknown,
    English,
    Hungarian,
    Other,
}

/// Languages a show may be ranked in.
pub const ACCEPTED_LANGUAGES: [LanguageClassification; 2] =
    [LanguageClassification::English, LanguageClassification::Hungarian];

pub const ENGLISH_SIGNAL_WORDS: [&str; 10] = [
    "about",
    "and",
    "episode",
    "from",
    "health",
    "interview",
    "science",
    "the",
    "this",
    "with",
];

pub const HUNGARIAN_SIGNAL_WORDS: [&str; 10] = [
    "beszelgetes",
    "egy",
    "es",
    "hogy",
    "interju",
    "magyar",
    "mert",
    "nem",
    "vagy",
    "van",
];

pub const HUNGARIAN_DIACRITICS: [char; 9] = ['á', 'é', 'í', 'ó', 'ö', 'ő', 'ú', 'ü', 'ű'];

/// Punctuation that separates words, in addition to whitespace.
pub const WORD_SEPARATORS: [char; 32] = [
    ',', '.', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '/', '\\', '|', '-',
    '_', '+', '=', '*', '&', '#', '@', '%', '^', '$', '<', '>', '~', '`',
];

impl LanguageClassification {
    /// Two-letter code of a known language.
    #[must_use]
    pub fn code(self) -> Option<&'static str> {
        match self {
            LanguageClassification::English => Some("en"),
            LanguageClassification::Hungarian => Some("hu"),
            LanguageClassification::Unknown | LanguageClassification::Other => None,
        }
    }

    #[must_use]
    pub fn is_accepted(self) -> bool {
        ACCEPTED_LANGUAGES.contains(&self)
    }

    /// The code to rank under, or `None` when the language is not accepted.
    #[must_use]
    pub fn accepted_code(self) -> Option<&'static str> {
        if self.is_accepted() {
            self.code()
        } else {
            None
        }
    }
}

struct TagRule {
    classification: LanguageClassification,
    prefix: &'static str,
    name: &'static str,
}

const TAG_RULES: [TagRule; 2] = [
    TagRule {
        classification: LanguageClassification::English,
        prefix: "en",
        name: "english",
    },
    TagRule {
        classification: LanguageClassification::Hungarian,
        prefix: "hu",
        name: "hungarian",
    },
];

/// Word-level evidence gathered from a show's name and description.
#[derive(Debug, Clone, Copy, Default)]
struct TextSignals {
    has_hungarian_diacritic: bool,
    english_hits: usize,
    hungarian_hits: usize,
}

type TextRule = fn(&TextSignals) -> Option<LanguageClassification>;

/// Evaluated in order; the first rule that fires decides.
const TEXT_RULES: [TextRule; 3] = [diacritic_rule, hungarian_words_rule, english_words_rule];

fn diacritic_rule(signals: &TextSignals) -> Option<LanguageClassification> {
    signals
        .has_hungarian_diacritic
        .then_some(LanguageClassification::Hungarian)
}

fn hungarian_words_rule(signals: &TextSignals) -> Option<LanguageClassification> {
    (signals.hungarian_hits >= 2 && signals.hungarian_hits > signals.english_hits)
        .then_some(LanguageClassification::Hungarian)
}

fn english_words_rule(signals: &TextSignals) -> Option<LanguageClassification> {
    (signals.english_hits >= 2 && signals.english_hits >= signals.hungarian_hits)
        .then_some(LanguageClassification::English)
}

/// Classify a declared language tag such as `en-US`, `English` or `hu_HU`.
///
/// Returns `None` for a blank tag. Non-blank tags that match no rule are
/// [`LanguageClassification::Other`].
#[must_use]
pub fn classify_tag(raw: &str) -> Option<LanguageClassification> {
    let normalized = raw.trim().to_lowercase().replace('_', "-");
    if normalized.is_empty() {
        return None;
    }

    let classification = TAG_RULES
        .iter()
        .find(|rule| normalized.starts_with(rule.prefix) || normalized.contains(rule.name))
        .map_or(LanguageClassification::Other, |rule| rule.classification);
    Some(classification)
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || WORD_SEPARATORS.contains(&c)
}

fn gather_signals(text: &str) -> TextSignals {
    let lowered = text.to_lowercase();
    let mut signals = TextSignals {
        has_hungarian_diacritic: lowered.contains(HUNGARIAN_DIACRITICS),
        ..TextSignals::default()
    };

    for word in lowered.split(is_separator).filter(|w| !w.is_empty()) {
        if ENGLISH_SIGNAL_WORDS.contains(&word) {
            signals.english_hits += 1;
        }
        if HUNGARIAN_SIGNAL_WORDS.contains(&word) {
            signals.hungarian_hits += 1;
        }
    }
    signals
}

/// Infer the language of an untagged show from its name and description.
#[must_use]
pub fn infer_from_text(name: &str, description: &str) -> LanguageClassification {
    let signals = gather_signals(&format!("{name} {description}"));
    TEXT_RULES
        .iter()
        .find_map(|rule| rule(&signals))
        .unwrap_or(LanguageClassification::Unknown)
}

/// Decide a show's language from its declared tag, or from its text when no
/// tag is declared.
#[must_use]
pub fn detect_language(
    declared: Option<&str>,
    name: &str,
    description: &str,
) -> LanguageClassification {
    declared
        .and_then(classify_tag)
        .unwrap_or_else(|| infer_from_text(name, description))
}
