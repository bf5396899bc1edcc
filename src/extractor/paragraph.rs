use lazy_static::lazy_static;
use regex::Regex;

use super::noise::starts_noise_run;
use super::quality::{char_len, is_good};

/// Past this the assembler returns whatever it has.
pub const MAX_PARAGRAPH_CHARS: usize = 700;

lazy_static! {
    static ref CODE_TITLE: Regex = Regex::new(r"^[A-Z0-9._-]{6,}$").unwrap();
    static ref OVERVIEW_LABEL: Regex =
        Regex::new(r"(?i)^(?:overview|vista general|resumen general)$").unwrap();
    static ref SECTION_BOUNDARY: Regex = Regex::new(
        r"(?i)^(?:specifications|especificaciones|documents?\s*(?:&|and)\s*downloads|documentos\s*y\s*descargas|support|soporte|related products?|productos relacionados)\b",
    )
    .unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[.;:]$").unwrap();
}

/// Short code-like header (an order number) or the Overview tab label.
pub fn is_title_line(line: &str) -> bool {
    CODE_TITLE.is_match(line) || OVERVIEW_LABEL.is_match(line)
}

/// Heading of a section that never belongs to the description.
pub fn is_section_boundary(line: &str) -> bool {
    char_len(line) <= 80 && SECTION_BOUNDARY.is_match(line)
}

/// Index of the line the description most likely starts at: the first line
/// mentioning the part number, else the first Overview label, else 0.
pub fn locate_anchor(lines: &[&str], mlfb: &str) -> usize {
    let needle = mlfb.trim().to_uppercase();
    if !needle.is_empty() {
        if let Some(i) = lines.iter().position(|l| l.to_uppercase().contains(&needle)) {
            return i;
        }
    }
    lines
        .iter()
        .position(|l| OVERVIEW_LABEL.is_match(l))
        .unwrap_or(0)
}

/// Builds one candidate paragraph from consecutive content lines.
///
/// Title lines close the current buffer: a passing buffer is returned,
/// anything else is thrown away and assembly restarts after the title. A
/// section boundary ends assembly for good.
pub fn assemble(lines: &[&str]) -> String {
    let mut buf: Vec<&str> = Vec::new();

    for &line in lines {
        if line.is_empty() {
            continue;
        }
        if is_section_boundary(line) {
            let joined = buf.join(" ");
            return if is_good(&joined) { joined } else { String::new() };
        }
        if is_title_line(line) {
            let joined = buf.join(" ");
            if is_good(&joined) {
                return joined;
            }
            buf.clear();
            continue;
        }
        if starts_noise_run(line) {
            continue;
        }

        buf.push(line);
        let joined = buf.join(" ");
        if is_good(&joined) && SENTENCE_END.is_match(line) {
            return joined;
        }
        if char_len(&joined) > MAX_PARAGRAPH_CHARS {
            return joined;
        }
    }

    let joined = buf.join(" ");
    if is_good(&joined) { joined } else { String::new() }
}
