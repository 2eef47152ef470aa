//! Unit boundaries over the flattened buffer.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use super::pieces::Flattened;
use crate::util::{byte_to_char, char_len, is_opening_punctuation};

/// Char range of the unit that starts at `start`, or `None` past the end.
///
/// A unit is the first UAX #29 sentence of the text between `start` and the
/// end of the next newline run, adjusted so that opening punctuation at its
/// tail moves to the next unit and superscript citations right after it are
/// pulled in.
pub fn unit_at(flat: &Flattened, start: usize) -> Option<Range<usize>> {
    if start >= flat.len {
        return None;
    }

    let from = flat.byte_offset(start);
    let rest = &flat.text[from..];
    let line = &rest[..line_end(rest)];

    let sentence = line.split_sentence_bounds().next().unwrap_or(line);
    let end = start + trim_opening_punctuation(sentence);
    let end = extend_over_superscripts(flat, start, end);

    Some(start..end)
}

/// Byte length of `text` up to and including its first run of newlines.
fn line_end(text: &str) -> usize {
    match memchr::memchr(b'\n', text.as_bytes()) {
        Some(nl) => {
            let run = text.as_bytes()[nl..]
                .iter()
                .take_while(|&&b| b == b'\n')
                .count();
            nl + run
        }
        None => text.len(),
    }
}

/// Char length of `sentence` once trailing opening punctuation is handed to
/// the next unit. A sentence made only of such punctuation is kept whole.
fn trim_opening_punctuation(sentence: &str) -> usize {
    let trimmed = sentence.trim_end_matches(is_opening_punctuation);
    if trimmed.is_empty() {
        char_len(sentence)
    } else {
        byte_to_char(sentence, trimmed.len())
    }
}

/// Pull a run of superscript pieces starting exactly at `end` into the unit,
/// unless the unit ends a line.
fn extend_over_superscripts(flat: &Flattened, start: usize, end: usize) -> usize {
    if end <= start || flat.char_before(end) == Some('\n') {
        return end;
    }
    let Some(mut idx) = flat.piece_starting_at(end) else {
        return end;
    };

    let mut extended = end;
    while let Some(piece) = flat.pieces.get(idx) {
        if !piece.superscript || piece.start != extended {
            break;
        }
        extended = piece.end();
        idx += 1;
    }
    extended
}
