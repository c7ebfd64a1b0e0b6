//! Batch loading of spreadsheet rows into a validated question pool.
//!
//! Row errors are collected, never propagated: one malformed cell must not
//! abort a 500-question sheet. Only a sheet that yields zero usable
//! questions fails the whole load.

use log::{debug, warn};

use crate::quiz_engine::errors::{LoadError, ParseError, RejectedRow};
use crate::quiz_engine::models::{
    AnswerKeySource, OptionLetter, Question, QuestionId, RawRow, UNSPECIFIED_TOPIC,
};
use crate::quiz_engine::parser::{parse_cell, AnswerKey, ParsedCell};

/// An immutable pool of validated questions plus the rows that did not make
/// it, kept for reporting back to whoever maintains the sheet.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
    rejected: Vec<RejectedRow>,
}

impl QuestionBank {
    /// Parse every row, collecting failures per row.
    ///
    /// Question ids are row positions, so they stay stable when a sheet is
    /// reloaded with the same ordering even if different rows get rejected.
    pub fn from_rows(rows: &[RawRow], source: AnswerKeySource) -> Result<Self, LoadError> {
        let mut questions = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for (row, raw) in rows.iter().enumerate() {
            let key = match source {
                AnswerKeySource::InlineMarker => AnswerKey::Inline,
                AnswerKeySource::Column => match column_letter(raw) {
                    Some(letter) => AnswerKey::External(letter),
                    None => {
                        warn!("row {row}: {}", ParseError::MissingAnswerKey);
                        rejected.push(RejectedRow { row, error: ParseError::MissingAnswerKey });
                        continue;
                    }
                },
            };
            match parse_cell(&raw.text, key) {
                Ok(cell) => questions.push(build_question(row, raw, cell)),
                Err(error) => {
                    warn!("row {row}: {error}");
                    rejected.push(RejectedRow { row, error });
                }
            }
        }

        if questions.is_empty() {
            return Err(LoadError::NoValidQuestions { rejected });
        }
        debug!(
            "loaded {} questions ({} rows rejected)",
            questions.len(),
            rejected.len()
        );
        Ok(QuestionBank { questions, rejected })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Rows that failed to parse, with their sheet positions.
    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    /// All question ids in sheet order.
    pub fn pool(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    /// Ids whose topic matches, case-insensitively. May come back empty;
    /// the selector reports that as [`EmptyPoolError`] rather than quietly
    /// falling back to the full bank.
    ///
    /// [`EmptyPoolError`]: crate::quiz_engine::errors::EmptyPoolError
    pub fn pool_for_topic(&self, topic: &str) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|q| q.topic.eq_ignore_ascii_case(topic))
            .map(|q| q.id)
            .collect()
    }
}

/// First letter of the answer column, if the row has a usable one.
fn column_letter(raw: &RawRow) -> Option<OptionLetter> {
    raw.answer
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .and_then(|a| a.chars().next())
        .and_then(OptionLetter::from_char)
}

/// Attach bank-level metadata to a parsed cell. The explanation column
/// outranks an inline explanation; the topic falls back to the sentinel.
fn build_question(row: usize, raw: &RawRow, cell: ParsedCell) -> Question {
    let explanation = raw
        .explanation
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .or(cell.explanation)
        .unwrap_or_default();
    let topic = raw
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNSPECIFIED_TOPIC)
        .to_string();

    Question {
        id: QuestionId(row as u32),
        stem: cell.stem,
        options: cell.options,
        correct_letter: cell.correct_letter,
        explanation,
        topic,
    }
}
