//! # med_quiz_engine
//!
//! The core of a medical multiple-choice study app: turn free-text
//! spreadsheet cells into validated questions and walk a user through them
//! with correct/incorrect tracking and a failed-question re-study bias.
//!
//! ## How it works
//!
//! 1. Hand each already-loaded sheet row to [`QuestionBank::from_rows`] —
//!    the cell parser splits the raw text into stem, labeled options
//!    (A–E), correct letter, and explanation, rejecting malformed rows
//!    individually instead of aborting the batch.
//! 2. Create a [`SessionState`] (seed it for reproducible runs) and call
//!    [`SessionState::next`] with a pool of question ids and a
//!    [`StudyMode`] — linear, random, or spaced-repetition-lite.
//! 3. Report each answer via [`SessionState::record_outcome`]; the tally
//!    and the failed-question set update as you go.
//!
//! ## Key features
//!
//! - **Format tolerance**: option delimiters `)`, `.`, and `-` may be
//!   mixed within one cell; option bodies may span lines; the answer
//!   marker ("Respuesta: B", "Correcta: B", "Answer: B") may sit before,
//!   between, or after the options.
//! - **No silent defaults**: a cell without an answer key is rejected with
//!   an explicit error, never quietly graded as "A".
//! - **Deterministic**: pass `Some(seed)` to [`SessionState::new`] to
//!   reproduce the exact same shuffles and draws every time.
//!
//! ## Quick start
//!
//! ```rust
//! use med_quiz_engine::{AnswerKeySource, QuestionBank, RawRow, SessionState, StudyMode};
//!
//! let rows = vec![
//!     RawRow::new("A 45-year-old man presents with crushing chest pain. What is the first drug to give? A) Aspirin B) Morphine C) Oxygen D) Nitroglycerin Respuesta: A"),
//!     RawRow::new("Classic finding in appendicitis? A) Murphy sign B) McBurney point tenderness Respuesta: B"),
//! ];
//! let bank = QuestionBank::from_rows(&rows, AnswerKeySource::InlineMarker).unwrap();
//! let pool = bank.pool();
//!
//! let mut session = SessionState::new(Some(42));
//! while let Some(id) = session.next(&pool, StudyMode::Linear).unwrap() {
//!     let question = bank.get(id).unwrap();
//!     // ... render question, collect the user's letter ...
//!     session.record_outcome(id, true, None);
//! }
//! assert_eq!(session.tally().correct, 2);
//! ```

pub mod client_adapter;
pub mod quiz_engine;

// Convenience re-exports so callers can use `med_quiz_engine::QuestionBank`
// directly without reaching into `quiz_engine::`.
pub use client_adapter::{to_client_state, to_reveal_state};
pub use quiz_engine::{
    parse_cell, AnswerKey, AnswerKeySource, AnswerOption, EmptyPoolError, Grade,
    LoadError, OptionLetter, Outcome, ParseError, ParsedCell, PerformanceBand,
    Question, QuestionBank, QuestionId, RawRow, RejectedRow, SessionState,
    StudyMode, Tally, FAILED_FIRST_WEIGHT, UNSPECIFIED_TOPIC,
};

#[cfg(test)]
mod tests;
