use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{ELLIPSIS, FINAL_MAX_CHARS};

/// Product families whose descriptions end at a fixed phrase. Everything
/// after the marker on these pages is accessory upsell.
struct FamilyCutoff {
    prefix: &'static str,
    marker: Regex,
}

lazy_static! {
    static ref FAMILY_CUTOFFS: Vec<FamilyCutoff> = vec![FamilyCutoff {
        prefix: "3VA",
        marker: Regex::new(r"(?i)keeper kit").unwrap(),
    }];
}

/// Truncates right after the family marker, marker included.
pub fn apply_family_cutoff(mlfb: &str, description: &str) -> String {
    let mlfb = mlfb.trim();
    for cutoff in FAMILY_CUTOFFS.iter() {
        let matches_family = mlfb
            .get(..cutoff.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(cutoff.prefix));
        if !matches_family {
            continue;
        }
        if let Some(m) = cutoff.marker.find(description) {
            return description[..m.end()].trim().to_string();
        }
    }
    description.to_string()
}

/// Caps the description at 900 characters, appending an ellipsis when cut.
pub fn cap_length(description: &str) -> String {
    match description.char_indices().nth(FINAL_MAX_CHARS) {
        Some((cut, _)) => {
            let mut out = description[..cut].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => description.to_string(),
    }
}

pub fn finalize(mlfb: &str, description: &str) -> String {
    cap_length(&apply_family_cutoff(mlfb, description))
}
