use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap();
    static ref LEADING_MARKERS: Regex = Regex::new(r"(?m)^[#>*+\- \t]+").unwrap();
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref ANY_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Turns proxy markdown into plain prose lines. Blank lines are kept so that
/// block boundaries survive for the noise filter.
pub fn normalize(raw: &str) -> String {
    let text = raw
        .replace('\u{00A0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let text = IMAGE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, "$1");
    let text = LEADING_MARKERS.replace_all(&text, "");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");

    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

pub fn collapse_whitespace(s: &str) -> String {
    ANY_SPACE.replace_all(s, " ").trim().to_string()
}

/// Uppercase ASCII alphanumerics only, so part numbers compare regardless
/// of case, spaces or dashes.
pub fn squash_code(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn mentions_code(text: &str, mlfb: &str) -> bool {
    let code = squash_code(mlfb);
    !code.is_empty() && squash_code(text).contains(&code)
}
