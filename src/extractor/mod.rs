pub mod noise;
pub mod normalize;
pub mod paragraph;
pub mod quality;

use crate::constants::{CATALOG_SCAN_CHARS, PORTAL_SCAN_CHARS};
use crate::models::SourceKind;

pub use normalize::{collapse_whitespace, normalize};
pub use quality::{is_good, score};

fn scan_limit(kind: SourceKind) -> usize {
    match kind {
        SourceKind::PrimaryPortal => PORTAL_SCAN_CHARS,
        SourceKind::SecondaryCatalog => CATALOG_SCAN_CHARS,
    }
}

/// Extracts the product description from one raw document.
///
/// Returns "" when the document is empty or nothing passes the quality gate.
pub fn extract_description(raw: &str, mlfb: &str, kind: SourceKind) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = normalize(raw);
    let lines: Vec<&str> = text.lines().collect();
    let lines = noise::filter_noise(&lines);

    let anchor = paragraph::locate_anchor(&lines, mlfb);

    // Only look a bounded distance past the anchor
    let limit = scan_limit(kind);
    let mut seen = 0usize;
    let window: Vec<&str> = lines[anchor..]
        .iter()
        .copied()
        .take_while(|line| {
            let within = seen < limit;
            seen += line.chars().count() + 1;
            within
        })
        .collect();

    let desc = collapse_whitespace(&paragraph::assemble(&window));
    if is_good(&desc) { desc } else { String::new() }
}
