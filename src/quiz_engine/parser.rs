//! Deterministic question-cell scanner.
//!
//! One unstructured text blob — a clinical vignette followed by inlined
//! options and, in many sheets, an inlined "Respuesta: X" marker and
//! explanation — becomes a structured [`ParsedCell`] in four named stages:
//!
//! 1. marker scan over the whole text,
//! 2. label scan in increasing letter order,
//! 3. slicing with the marker span excised,
//! 4. validation.
//!
//! The scanner is a pure text transform: no I/O, no state, safe to call
//! concurrently from any number of threads.

use crate::quiz_engine::errors::ParseError;
use crate::quiz_engine::models::{AnswerOption, OptionLetter};

/// Marker keywords recognized case-insensitively. Longer forms first so
/// "respuesta correcta: B" is consumed whole rather than leaving
/// "respuesta" behind in the option text.
const MARKER_KEYWORDS: [&str; 6] = [
    "respuesta correcta",
    "respuesta",
    "correcta",
    "answer",
    "key",
    "r/",
];

/// Separators accepted between a marker keyword and its letter.
const MARKER_SEPARATORS: [char; 3] = [':', '=', '-'];

/// Delimiters accepted after an option letter. Real sheets mix all three
/// within a single cell.
const LABEL_DELIMITERS: [char; 3] = [')', '.', '-'];

/// How the correct answer for a cell is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    /// Use the letter from the inline marker; fail with
    /// [`ParseError::MissingAnswerKey`] when the cell has none.
    Inline,
    /// Use a caller-supplied letter (e.g. a separate sheet column). An
    /// inline marker, if present, is still stripped from the text but its
    /// letter is ignored.
    External(OptionLetter),
}

/// A fully parsed and validated cell, before bank-level metadata (id,
/// topic, explanation column) is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCell {
    pub stem: String,
    pub options: Vec<AnswerOption>,
    pub correct_letter: OptionLetter,
    /// Trailing text found after a marker that follows the last option.
    /// `None` when the cell carries no inline explanation.
    pub explanation: Option<String>,
}

/// Parse one raw question cell.
///
/// The text may contain embedded newlines, an answer-key marker anywhere
/// (before, between, or after the options), and 2 to 5 labeled options.
/// Any violation of the question invariants yields a specific
/// [`ParseError`] — a degraded partial record is never produced.
pub fn parse_cell(raw_text: &str, key: AnswerKey) -> Result<ParsedCell, ParseError> {
    let marker = find_marker(raw_text);
    let labels = find_labels(raw_text, marker.as_ref());
    if labels.len() < 2 {
        return Err(ParseError::NoOptionsFound);
    }

    let stem = slice_clean(raw_text, 0, labels[0].start, marker.as_ref());
    if stem.is_empty() {
        return Err(ParseError::EmptyStem);
    }

    let mut options = Vec::with_capacity(labels.len());
    let mut explanation = None;

    for (i, label) in labels.iter().enumerate() {
        let end = labels.get(i + 1).map_or(raw_text.len(), |next| next.start);
        let is_last = i + 1 == labels.len();
        let text = match marker.as_ref() {
            // A marker inside the last option's slice splits it: option
            // text before the marker, explanation paragraph after it.
            // Without a trailing marker the tail is ambiguous and stays
            // part of the option rather than being discarded.
            Some(m) if is_last && m.start >= label.body_start && m.start < end => {
                let tail = normalize_ws(&raw_text[m.end..end]);
                if !tail.is_empty() {
                    explanation = Some(tail);
                }
                normalize_ws(&raw_text[label.body_start..m.start])
            }
            _ => slice_clean(raw_text, label.body_start, end, marker.as_ref()),
        };
        // A label with no body is not a well-formed option.
        if text.is_empty() {
            continue;
        }
        options.push(AnswerOption { letter: label.letter, text });
    }
    if options.len() < 2 {
        return Err(ParseError::NoOptionsFound);
    }

    let correct_letter = match key {
        AnswerKey::External(letter) => letter,
        AnswerKey::Inline => match &marker {
            Some(m) => m.letter,
            None => return Err(ParseError::MissingAnswerKey),
        },
    };
    if !options.iter().any(|o| o.letter == correct_letter) {
        return Err(ParseError::AnswerKeyNotInOptions(correct_letter));
    }

    Ok(ParsedCell { stem, options, correct_letter, explanation })
}

// ---------------------------------------------------------------------------
// Stage 1: marker scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct MarkerMatch {
    /// Byte span of the whole marker, keyword through letter (plus any
    /// directly attached '.' or ')'), so it can be excised from the text.
    start: usize,
    end: usize,
    letter: OptionLetter,
}

/// Locate the first answer-key marker anywhere in `text`.
fn find_marker(text: &str) -> Option<MarkerMatch> {
    let mut prev: Option<char> = None;
    for (pos, ch) in text.char_indices() {
        let at_word_start = prev.map_or(true, |p| !p.is_alphanumeric());
        if at_word_start {
            for keyword in MARKER_KEYWORDS {
                if let Some(m) = match_marker_at(text, pos, keyword) {
                    return Some(m);
                }
            }
        }
        prev = Some(ch);
    }
    None
}

/// Try to match `keyword` (then separator, then a single letter A-E) at
/// byte offset `pos`.
fn match_marker_at(text: &str, pos: usize, keyword: &str) -> Option<MarkerMatch> {
    let rest = &text[pos..];
    if rest.len() < keyword.len() || !rest.is_char_boundary(keyword.len()) {
        return None;
    }
    if !rest[..keyword.len()].eq_ignore_ascii_case(keyword) {
        return None;
    }

    let tail = &rest[keyword.len()..];
    let mut it = tail.char_indices().peekable();

    while let Some(&(_, c)) = it.peek() {
        if !c.is_whitespace() {
            break;
        }
        it.next();
    }
    // The separator is required: it is what distinguishes "Respuesta: B"
    // from prose like "answers B and C" or "correctamente".
    match it.peek() {
        Some(&(_, c)) if MARKER_SEPARATORS.contains(&c) => {
            it.next();
        }
        _ => return None,
    }
    while let Some(&(_, c)) = it.peek() {
        if !c.is_whitespace() {
            break;
        }
        it.next();
    }

    let (letter_off, letter_ch) = it.next()?;
    let letter = OptionLetter::from_char(letter_ch)?;
    // The letter must stand alone: "Answer: Because" is not a marker.
    if let Some(&(_, after)) = it.peek() {
        if after.is_alphanumeric() {
            return None;
        }
    }

    let mut end = pos + keyword.len() + letter_off + letter_ch.len_utf8();
    if let Some(&(_, after)) = it.peek() {
        if after == '.' || after == ')' {
            end += after.len_utf8();
        }
    }
    Some(MarkerMatch { start: pos, end, letter })
}

// ---------------------------------------------------------------------------
// Stage 2: label scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct LabelMatch {
    letter: OptionLetter,
    /// Byte offset of the letter itself.
    start: usize,
    /// Byte offset just past the delimiter, where the option body begins.
    body_start: usize,
}

/// Locate option labels in strictly increasing letter order. Each letter is
/// searched from just past the previous find, so a line break inside one
/// option's body can only be mistaken for a label if it actually carries
/// the next expected letter and delimiter. Candidates overlapping the
/// marker span are skipped — "Respuesta: B." must not read as label "B.".
fn find_labels(text: &str, marker: Option<&MarkerMatch>) -> Vec<LabelMatch> {
    let mut labels: Vec<LabelMatch> = Vec::new();
    let mut from = 0usize;
    let mut expected = Some(OptionLetter::A);

    while let Some(letter) = expected {
        if let Some(label) = find_label_from(text, from, letter, marker) {
            from = label.body_start;
            labels.push(label);
        }
        expected = letter.next();
    }
    labels
}

/// First occurrence of `letter` + delimiter at or after `from`, at a word
/// start. Labels are uppercase in every sheet variant; lowercase letters
/// in running text never open an option.
fn find_label_from(
    text: &str,
    from: usize,
    letter: OptionLetter,
    marker: Option<&MarkerMatch>,
) -> Option<LabelMatch> {
    let mut prev: Option<char> = if from == 0 {
        None
    } else {
        text[..from].chars().next_back()
    };
    let mut it = text[from..].char_indices().peekable();

    while let Some((off, ch)) = it.next() {
        let pos = from + off;
        let at_word_start = prev.map_or(true, |p| p.is_whitespace());
        prev = Some(ch);
        if !at_word_start || !ch.is_ascii_uppercase() {
            continue;
        }
        if OptionLetter::from_char(ch) != Some(letter) {
            continue;
        }
        let Some(&(delim_off, delim)) = it.peek() else {
            continue;
        };
        if !LABEL_DELIMITERS.contains(&delim) {
            continue;
        }
        if let Some(m) = marker {
            if pos >= m.start && pos < m.end {
                continue;
            }
        }
        return Some(LabelMatch {
            letter,
            start: pos,
            body_start: from + delim_off + delim.len_utf8(),
        });
    }
    None
}

// ---------------------------------------------------------------------------
// Stage 3: slicing
// ---------------------------------------------------------------------------

/// Cut `text[start..end]`, excising the marker span when it falls inside,
/// and normalize the result.
fn slice_clean(text: &str, start: usize, end: usize, marker: Option<&MarkerMatch>) -> String {
    let piece = match marker {
        Some(m) if m.start >= start && m.start < end => {
            format!("{} {}", &text[start..m.start], &text[m.end..end])
        }
        _ => text[start..end].to_string(),
    };
    normalize_ws(&piece)
}

/// Collapse internal whitespace runs (including newlines) to single spaces
/// and trim both ends.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
