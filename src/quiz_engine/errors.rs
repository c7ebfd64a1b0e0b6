use thiserror::Error;

use crate::quiz_engine::models::OptionLetter;

/// Why a single question cell was rejected. Always row-local: one bad cell
/// never aborts the batch, it lands in the rejected list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("fewer than two labeled options found in the cell text")]
    NoOptionsFound,
    #[error("no answer-key marker in the cell text and no answer column supplied")]
    MissingAnswerKey,
    #[error("answer key names option {0}, which is not among the parsed options")]
    AnswerKeyNotInOptions(OptionLetter),
    #[error("no stem text before the first option label")]
    EmptyStem,
}

/// One rejected source row, with the position needed to fix the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub row: usize,
    pub error: ParseError,
}

/// Batch loading failed outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Not a single row produced a valid question. Surfaced as one clear
    /// failure before any selection or rendering can start.
    #[error("no row produced a valid question ({} rejected)", .rejected.len())]
    NoValidQuestions { rejected: Vec<RejectedRow> },
}

/// The selector was asked to pick from zero candidates. Fatal to the
/// calling operation — never retried with a different pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("selection requested from an empty question pool")]
pub struct EmptyPoolError;
