//! Character-offset helpers and punctuation predicates.
//!
//! Every offset the engine exposes counts Unicode scalar values, so these
//! helpers translate between char offsets and the byte offsets `str` wants.

use std::ops::Range;

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the char at `char_idx`, clamped to the end of `s`.
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Char offset of the byte offset `byte_idx` (which must be a char boundary).
pub fn byte_to_char(s: &str, byte_idx: usize) -> usize {
    s[..byte_idx.min(s.len())].chars().count()
}

/// Slice `s` by a char range, clamped to its length.
pub fn char_slice(s: &str, range: Range<usize>) -> &str {
    let start = char_to_byte(s, range.start);
    let end = char_to_byte(s, range.end.max(range.start));
    &s[start..end]
}

/// Characters that open a bracketed or quoted run.
pub fn is_opening_punctuation(c: char) -> bool {
    matches!(
        c,
        '(' | '[' | '{' | '<' | '“' | '‘' | '«' | '¿' | '¡' | '「' | '『' | '（' | '［'
    )
}

/// Characters that end a phrase.
pub fn is_phrase_break(c: char) -> bool {
    matches!(
        c,
        ',' | ';' | ':' | '—' | '–' | '(' | ')' | '\n' | '、' | '，' | '；' | '：'
    )
}

/// Whether the text contains anything worth highlighting on its own: a
/// letter or digit in any script. Whitespace and punctuation alone are not.
pub fn has_meaningful_content(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Whether a text node is only formatting whitespace (contains a line
/// break and nothing else).
pub fn is_structural_whitespace(text: &str) -> bool {
    text.contains('\n') && text.chars().all(char::is_whitespace)
}
