use lazy_static::lazy_static;
use regex::Regex;

use super::paragraph::is_section_boundary;

/// A single line that is chrome wherever it appears.
struct LineRule {
    #[allow(dead_code)]
    name: &'static str,
    pattern: Regex,
    /// Only drop lines up to this many characters; longer ones may be prose.
    max_chars: Option<usize>,
}

enum RunEnd {
    /// Run ends on (and includes) the first line matching the terminator.
    /// If none shows up within the lookahead, only the start line goes.
    Terminator(Regex),
    /// Run ends before the next blank line or section boundary.
    EndOfBlock,
}

/// A start line plus a bounded number of following lines.
struct RunRule {
    #[allow(dead_code)]
    name: &'static str,
    start: Regex,
    end: RunEnd,
    lookahead: usize,
}

lazy_static! {
    static ref LINE_RULES: Vec<LineRule> = vec![
        // Consent banners
        LineRule {
            name: "cookies",
            pattern: Regex::new(r"(?i)\bcookies?\b|\bconsent\b").unwrap(),
            max_chars: Some(160),
        },
        // Header and footer navigation labels
        LineRule {
            name: "navigation",
            pattern: Regex::new(
                r"(?i)^(?:privacy(?: policy| notice| settings)?|terms(?: of use| and conditions| & conditions)?|log ?in|log ?out|sign ?in|sign ?up|register|my account|(?:shopping )?cart|search|menu|home|contact(?: us)?|imprint|legal notice|corporate information|digital id|skip to (?:main )?content)\b",
            )
            .unwrap(),
            max_chars: Some(60),
        },
        LineRule {
            name: "image caption",
            pattern: Regex::new(r"(?i)^image \d+:?").unwrap(),
            max_chars: None,
        },
        LineRule {
            name: "carousel",
            pattern: Regex::new(r"(?i)^slide \d+ of \d+|\bstories carousel\b").unwrap(),
            max_chars: None,
        },
        // Header block the reader proxy puts in front of every page
        LineRule {
            name: "proxy metadata",
            pattern: Regex::new(r"(?i)^(?:title|url source|published time|markdown content|warning):")
                .unwrap(),
            max_chars: None,
        },
    ];

    static ref RUN_RULES: Vec<RunRule> = vec![
        // Promotional "trending" strip that precedes the stories carousel
        RunRule {
            name: "trending stories",
            start: Regex::new(r"(?i)^based on trending topics").unwrap(),
            end: RunEnd::Terminator(Regex::new(r"(?i)stories carousel|slide \d+ of \d+").unwrap()),
            lookahead: 40,
        },
        // Portal side panels: updates, "see all" lists, downloads, certificates
        RunRule {
            name: "disposable tail",
            start: Regex::new(
                r"(?i)^(?:updates? for|see all\b|downloads?\b|catalog(?:/| )brochures?|application examples?|faqs?\b|certificates?\b|gsd:|product notes?\b|eu declaration of conformity|buy now|add to cart|print\b)",
            )
            .unwrap(),
            end: RunEnd::EndOfBlock,
            lookahead: 12,
        },
    ];
}

pub fn is_noise_line(line: &str) -> bool {
    LINE_RULES.iter().any(|rule| {
        rule.max_chars
            .is_none_or(|max| line.chars().count() <= max)
            && rule.pattern.is_match(line)
    })
}

/// True when `line` opens a run that the filter would discard.
pub fn starts_noise_run(line: &str) -> bool {
    RUN_RULES.iter().any(|rule| rule.start.is_match(line))
}

/// Number of lines to drop if a run rule starts at `lines[at]`.
fn run_length(lines: &[&str], at: usize) -> Option<usize> {
    let rule = RUN_RULES.iter().find(|rule| rule.start.is_match(lines[at]))?;
    let limit = (at + 1 + rule.lookahead).min(lines.len());

    let len = match &rule.end {
        RunEnd::Terminator(end) => (at + 1..limit)
            .find(|&j| end.is_match(lines[j]))
            .map_or(1, |j| j - at + 1),
        RunEnd::EndOfBlock => {
            let mut j = at + 1;
            while j < limit && !lines[j].is_empty() && !is_section_boundary(lines[j]) {
                j += 1;
            }
            j - at
        }
    };
    Some(len)
}

/// Drops boilerplate from normalized lines. Blank lines are kept.
pub fn filter_noise<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if let Some(skip) = run_length(lines, i) {
            i += skip;
            continue;
        }
        if !is_noise_line(lines[i]) {
            kept.push(lines[i]);
        }
        i += 1;
    }
    kept
}
