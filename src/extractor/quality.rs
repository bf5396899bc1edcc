use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_CHARS: usize = 60;
pub const LONG_ENOUGH_CHARS: usize = 140;
pub const SCORE_LENGTH_CAP: usize = 600;
pub const VOCABULARY_BONUS: f64 = 40.0;

/// One family of technical vocabulary. Patterns carry their own boundaries.
struct VocabularyRule {
    #[allow(dead_code)]
    name: &'static str,
    pattern: &'static str,
    case_sensitive: bool,
}

const VOCABULARY: &[VocabularyRule] = &[
    VocabularyRule {
        name: "components",
        pattern: r"\b(?:breakers?|contactors?|modules?|módulos?|frame|bus\s*bars?|PLC|ET\s?200\w*)\b|\bLOGO!",
        case_sensitive: false,
    },
    VocabularyRule {
        name: "signals",
        pattern: r"\b(?:inputs?|outputs?|I/O|PNP|diagnostics|protection|short-?circuit|overload)\b",
        case_sensitive: false,
    },
    VocabularyRule {
        name: "standards",
        pattern: r"\b(?:IEC(?:\s*61131)?|UL|IP\d{2})\b",
        case_sensitive: false,
    },
    VocabularyRule {
        name: "ratings",
        pattern: r"\b(?:In|Icu|Ir|Ii)=|\b(?:3[- ]?pole|3P|type\s*\d|24\s?V|AC|DC)\b",
        case_sensitive: false,
    },
    // Unit letters count only in SI case and not glued to a preceding letter,
    // so "100A" and "415 V" hit while the article "a" does not.
    VocabularyRule {
        name: "units",
        pattern: r"(?:^|[^\p{L}])(?:V|A|kA|kW|mm)\b",
        case_sensitive: true,
    },
];

lazy_static! {
    static ref VOCABULARY_PATTERNS: Vec<Regex> = VOCABULARY
        .iter()
        .map(|rule| {
            let flags = if rule.case_sensitive { "" } else { "(?i)" };
            Regex::new(&format!("{flags}(?:{})", rule.pattern)).unwrap()
        })
        .collect();
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn has_vocabulary(s: &str) -> bool {
    VOCABULARY_PATTERNS.iter().any(|re| re.is_match(s))
}

/// Acceptance test for an extracted description.
pub fn is_good(s: &str) -> bool {
    let len = char_len(s);
    if len < MIN_CHARS {
        return false;
    }
    has_vocabulary(s) || len > LONG_ENOUGH_CHARS
}

/// `min(len, 600) / 10`, plus a flat bonus for technical vocabulary.
pub fn score(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let base = char_len(s).min(SCORE_LENGTH_CAP) as f64 / 10.0;
    if has_vocabulary(s) {
        base + VOCABULARY_BONUS
    } else {
        base
    }
}
