//! Splits normalized text into bounded-size chunks for the enhancement
//! model's context window.
//!
//! Splitting happens at sentence terminators (`.`, `!`, `?`); sentences
//! are re-terminated with `.` when appended, a documented lossy
//! normalization of punctuation. A single sentence longer than the budget
//! is emitted as its own oversized chunk rather than being split
//! mid-sentence.

/// Split `text` into chunks of at most `max_size` characters.
///
/// Texts already within budget are returned as a single chunk verbatim.
/// Every sentence of the input appears in exactly one chunk, in order.
pub fn chunk(text: &str, max_size: usize) -> Vec<String> {
    if text.chars().count() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut buf_chars = 0usize;

    for sentence in split_sentences(text) {
        // +2 for the ". " re-termination
        let addition = sentence.chars().count() + 2;
        if buf_chars > 0 && buf_chars + addition > max_size {
            chunks.push(buf.trim_end().to_string());
            buf.clear();
            buf_chars = 0;
        }
        buf.push_str(sentence);
        buf.push_str(". ");
        buf_chars += addition;
    }

    let tail = buf.trim_end();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }
    chunks
}

/// Sentence pieces between terminator characters, trimmed, empties dropped.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
