//! Word and phrase sub-ranges of a unit.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::util::{byte_to_char, is_phrase_break};

/// A UAX #29 word token, in chars.
struct Token {
    range: Range<usize>,
    is_word: bool,
}

fn tokens(text: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut char_pos = 0;
    for (byte_idx, token) in text.split_word_bound_indices() {
        debug_assert_eq!(char_pos, byte_to_char(text, byte_idx));
        let len = token.chars().count();
        out.push(Token {
            range: char_pos..char_pos + len,
            is_word: token.chars().any(char::is_alphanumeric),
        });
        char_pos += len;
    }
    out
}

/// Range from `index` to the end of the word being spoken there.
///
/// Leading whitespace or punctuation at `index` is part of the range,
/// trailing punctuation after the word is not. `None` when no word starts
/// or continues at or after `index`.
pub fn word_range(text: &str, index: usize) -> Option<Range<usize>> {
    let tokens = tokens(text);
    let word = tokens.iter().find(|t| t.is_word && t.range.end > index)?;
    Some(index..word.range.end)
}

/// Range from `index` to the end of the last word before the next phrase
/// break (or the end of the unit).
pub fn phrase_range(text: &str, index: usize) -> Option<Range<usize>> {
    let tokens = tokens(text);
    let first = tokens
        .iter()
        .position(|t| t.is_word && t.range.end > index)?;

    let mut end = tokens[first].range.end;
    for token in &tokens[first + 1..] {
        if token_breaks_phrase(text, &token.range) {
            break;
        }
        if token.is_word {
            end = token.range.end;
        }
    }
    Some(index..end)
}

fn token_breaks_phrase(text: &str, range: &Range<usize>) -> bool {
    text.chars()
        .skip(range.start)
        .take(range.len())
        .any(is_phrase_break)
}
