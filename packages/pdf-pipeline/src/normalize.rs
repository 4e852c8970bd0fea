//! Normalization of scraped fragments into clean prose.
//!
//! Raw scraping produces duplicate runs (several heuristic rules match the
//! same literal), control characters from binary spillover, and erratic
//! whitespace. Normalization collapses all of that into a single clean
//! string, or reports the document as unreadable.

use std::collections::HashSet;

use crate::scraper::Fragment;

/// Texts shorter than this after cleaning are reported as unreadable.
pub const MIN_READABLE_LEN: usize = 10;

/// When fewer than this share of words are distinct, the text is treated
/// as scraping-artifact repetition and replaced with its deduplicated
/// word sequence. A heuristic, not a correctness guarantee.
const DISTINCT_WORD_RATIO: f64 = 0.7;

/// Join fragments and normalize. `None` means no readable text.
pub fn normalize(fragments: &[Fragment]) -> Option<String> {
    let joined = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    normalize_text(&joined)
}

/// Normalize a raw extracted string. `None` means no readable text.
///
/// Output invariants:
/// - no control characters (0x00-0x08, 0x0B, 0x0C, 0x0E-0x1F, 0x7F)
/// - whitespace runs collapsed to one space, paragraph breaks kept as `\n\n`
/// - no leading or trailing whitespace
pub fn normalize_text(raw: &str) -> Option<String> {
    let stripped = strip_control_chars(raw);
    let collapsed = collapse_whitespace(&stripped);
    let text = dedup_guard(collapsed);

    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_READABLE_LEN
        || !trimmed.chars().any(|c| c.is_alphabetic())
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Remove non-printable control characters that corrupt downstream
/// string storage. Tab, newline, and carriage return survive into the
/// whitespace pass.
fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| !matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'))
        .collect()
}

/// Collapse whitespace runs to single spaces, preserving paragraph
/// breaks as exactly two newlines.
fn collapse_whitespace(s: &str) -> String {
    s.replace("\r\n", "\n")
        .split("\n\n")
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replace repetition-dominated text with its first-occurrence word
/// sequence.
fn dedup_guard(text: String) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return text;
    }

    let distinct: HashSet<&str> = words.iter().copied().collect();
    if (distinct.len() as f64) >= DISTINCT_WORD_RATIO * words.len() as f64 {
        return text;
    }

    let mut seen = HashSet::new();
    let deduped: Vec<&str> = words
        .into_iter()
        .filter(|w| seen.insert(*w))
        .collect();
    deduped.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::ScrapeRule;

    fn frag(text: &str) -> Fragment {
        Fragment::new(text, ScrapeRule::ShowText)
    }

    #[test]
    fn test_normalize_joins_with_spaces() {
        let fragments = vec![frag("Quarterly report"), frag("for fiscal 2024")];
        assert_eq!(
            normalize(&fragments).unwrap(),
            "Quarterly report for fiscal 2024"
        );
    }

    #[test]
    fn test_strips_control_characters() {
        let input = "Bal\u{0}ance\u{1} due:\u{7F} 40\u{0B} dollars";
        let out = normalize_text(input).unwrap();
        assert_eq!(out, "Balance due: 40 dollars");
        assert!(out.chars().all(|c| {
            !matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
        }));
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        let out = normalize_text("too   many\t\tspaces\n in   here").unwrap();
        assert_eq!(out, "too many spaces in here");
    }

    #[test]
    fn test_preserves_paragraph_breaks() {
        let out = normalize_text("page one text here\n\n\n\npage two text here").unwrap();
        assert_eq!(out, "page one text here\n\npage two text here");
    }

    #[test]
    fn test_dedup_guard_triggers_on_repetition() {
        // 2 distinct words out of 8 total: well under the 70% threshold
        let out = normalize_text("invoice total invoice total invoice total invoice total")
            .unwrap();
        assert_eq!(out, "invoice total");
    }

    #[test]
    fn test_dedup_guard_leaves_normal_prose_alone() {
        let input = "the quick brown fox jumps over the lazy dog";
        assert_eq!(normalize_text(input).unwrap(), input);
    }

    #[test]
    fn test_unreadable_when_too_short() {
        assert_eq!(normalize_text("hi there"), None);
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize(&[]), None);
    }

    #[test]
    fn test_unreadable_without_alphabetic() {
        assert_eq!(normalize_text("0123456789 4567 99 100 2024"), None);
    }

    #[test]
    fn test_scenario_a_duplicate_rule_matches_collapse() {
        // "Hello World" matched by two rules produces a repeated join;
        // the dedup guard restores the original phrase.
        let fragments = vec![frag("Hello World"), frag("Hello World")];
        assert_eq!(normalize(&fragments).unwrap(), "Hello World");
    }
}
