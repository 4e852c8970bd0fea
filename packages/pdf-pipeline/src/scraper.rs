//! Best-effort text recovery from raw PDF bytes.
//!
//! Two extraction paths live here:
//!
//! - [`structured_extract`] walks the PDF object model with `pdf-extract`.
//!   This is the first-choice path but fails on damaged or unusual files.
//! - [`Scraper`] applies heuristic pattern matching over the raw bytes
//!   without parsing the object graph. It never fails; at worst it finds
//!   nothing and returns an empty fragment list.
//!
//! The heuristics target the PDF text-showing operators (`Tj`, `TJ`) and
//! readable runs inside content streams. Results are approximate by design:
//! encrypted streams, embedded fonts, and scanned images yield nothing,
//! and that is reported as "no readable text" rather than an error.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

lazy_static! {
    /// `[ (a) -12 (b) ] TJ` array show-text runs
    static ref TJ_ARRAY: Regex = Regex::new(r"(?s)\[(.*?)\]\s*TJ").unwrap();
    /// `(text) Tj` simple show-text runs
    static ref TJ_SIMPLE: Regex = Regex::new(r"\(((?:[^()\\]|\\.)*)\)\s*Tj").unwrap();
    /// Bare parenthesis-delimited string literals
    static ref PAREN_LITERAL: Regex = Regex::new(r"\(((?:[^()\\]|\\.)*)\)").unwrap();
    /// `stream ... endstream` content blocks
    static ref STREAM_BLOCK: Regex = Regex::new(r"(?s)stream\r?\n(.*?)endstream").unwrap();
    /// Printable-ASCII runs long enough to plausibly be prose
    static ref PRINTABLE_RUN: Regex = Regex::new(r"[ -~]{10,}").unwrap();
}

/// Minimum length for a bare parenthesis literal to be kept.
const MIN_LITERAL_LEN: usize = 3;

/// The heuristic rule that recovered a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeRule {
    /// `[ ... ] TJ` bracketed array show-text
    ArrayShowText,
    /// `( ... ) Tj` simple show-text
    ShowText,
    /// Bare parenthesis literal (catch-all for missed operators)
    ParenLiteral,
    /// Readable content inside `stream ... endstream`
    StreamContent,
    /// Page/paragraph break marker inserted between stream blocks
    PageBreak,
}

/// A candidate piece of readable text, tagged with its producing rule.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
    pub rule: ScrapeRule,
}

impl Fragment {
    pub fn new(text: impl Into<String>, rule: ScrapeRule) -> Self {
        Self {
            text: text.into(),
            rule,
        }
    }

    /// Paragraph-break marker preserved by the normalizer as `\n\n`.
    pub fn page_break() -> Self {
        Self::new("\n\n", ScrapeRule::PageBreak)
    }
}

/// Heuristic byte-stream scraper with a configurable rule order.
#[derive(Debug, Clone)]
pub struct Scraper {
    rules: Vec<ScrapeRule>,
}

impl Default for Scraper {
    fn default() -> Self {
        Self {
            rules: vec![
                ScrapeRule::ArrayShowText,
                ScrapeRule::ShowText,
                ScrapeRule::ParenLiteral,
                ScrapeRule::StreamContent,
            ],
        }
    }
}

impl Scraper {
    /// Scraper with a custom rule order.
    pub fn with_rules(rules: Vec<ScrapeRule>) -> Self {
        Self { rules }
    }

    /// Recover text fragments from raw bytes.
    ///
    /// Total over all inputs: malformed bytes that match no rule produce
    /// an empty list, never an error.
    pub fn scrape(&self, bytes: &[u8]) -> Vec<Fragment> {
        let haystack = latin1_to_string(bytes);
        let mut fragments = Vec::new();

        for rule in &self.rules {
            match rule {
                ScrapeRule::ArrayShowText => Self::scrape_tj_arrays(&haystack, &mut fragments),
                ScrapeRule::ShowText => Self::scrape_tj_simple(&haystack, &mut fragments),
                ScrapeRule::ParenLiteral => Self::scrape_paren_literals(&haystack, &mut fragments),
                ScrapeRule::StreamContent => Self::scrape_streams(&haystack, &mut fragments),
                ScrapeRule::PageBreak => {}
            }
        }

        debug!(
            fragment_count = fragments.len(),
            byte_len = bytes.len(),
            "heuristic scrape complete"
        );
        fragments
    }

    fn scrape_tj_arrays(haystack: &str, out: &mut Vec<Fragment>) {
        for array in TJ_ARRAY.captures_iter(haystack) {
            for literal in PAREN_LITERAL.captures_iter(&array[1]) {
                push_if_readable(out, &literal[1], ScrapeRule::ArrayShowText, 1);
            }
        }
    }

    fn scrape_tj_simple(haystack: &str, out: &mut Vec<Fragment>) {
        for cap in TJ_SIMPLE.captures_iter(haystack) {
            push_if_readable(out, &cap[1], ScrapeRule::ShowText, 1);
        }
    }

    fn scrape_paren_literals(haystack: &str, out: &mut Vec<Fragment>) {
        for cap in PAREN_LITERAL.captures_iter(haystack) {
            push_if_readable(out, &cap[1], ScrapeRule::ParenLiteral, MIN_LITERAL_LEN);
        }
    }

    fn scrape_streams(haystack: &str, out: &mut Vec<Fragment>) {
        for block in STREAM_BLOCK.captures_iter(haystack) {
            let before = out.len();
            for cap in PAREN_LITERAL.captures_iter(&block[1]) {
                push_if_readable(out, &cap[1], ScrapeRule::StreamContent, MIN_LITERAL_LEN);
            }
            for run in PRINTABLE_RUN.find_iter(&block[1]) {
                let text = run.as_str();
                if text.chars().any(|c| c.is_ascii_alphabetic()) {
                    out.push(Fragment::new(text, ScrapeRule::StreamContent));
                }
            }
            if out.len() > before {
                out.push(Fragment::page_break());
            }
        }
    }
}

/// First-choice extraction through the PDF object model.
///
/// Returns `None` when the parse fails; the caller falls back to the
/// heuristic scraper. `pdf-extract` is not hardened against malformed
/// files, so panics from the parser are contained here.
pub fn structured_extract(bytes: &[u8]) -> Option<String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            debug!(error = %e, "structured PDF parse failed");
            None
        }
        Err(_) => {
            warn!("structured PDF parser panicked on input");
            None
        }
    }
}

/// Decode bytes as Latin-1 so every byte maps to exactly one character.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn push_if_readable(out: &mut Vec<Fragment>, raw: &str, rule: ScrapeRule, min_len: usize) {
    let text = unescape_literal(raw);
    if text.chars().count() >= min_len && has_alphanumeric(&text) {
        out.push(Fragment::new(text, rule));
    }
}

fn has_alphanumeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Resolve PDF string-literal escapes: `\(`, `\)`, `\\`, `\n`, `\r`, `\t`
/// and octal `\ddd`.
fn unescape_literal(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(d @ '0'..='7') => {
                let mut code = d.to_digit(8).unwrap();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            chars.next();
                            code = code * 8 + digit;
                        }
                        None => break,
                    }
                }
                if let Some(ch) = char::from_u32(code) {
                    result.push(ch);
                }
            }
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}
