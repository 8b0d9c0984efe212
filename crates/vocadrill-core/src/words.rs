//! Word-list text conversion.
//!
//! Lists are edited as plain text, one word per line.

/// Split text into words, one per line.
///
/// Trailing `\r` and surrounding whitespace are trimmed; blank lines are
/// dropped. Duplicates are kept.
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_word_list`] for display and editing.
pub fn format_word_list(words: &[String]) -> String {
    words.join("\n")
}
