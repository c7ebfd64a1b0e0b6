//! JSON payloads for a web client.
//!
//! The presentation layer renders two screens per question: the prompt
//! (stem, labeled options, progress, running stats) and the reveal
//! (correctness, correct letter, explanation). These builders map core
//! types to those payloads; no rendering, styling, or transport lives here.

use serde_json::{json, Value};

use crate::quiz_engine::models::{AnswerOption, OptionLetter, Question, Tally};

/// Render an option the way the client displays it: "A) text".
fn labeled_option(option: &AnswerOption) -> String {
    format!("{}) {}", option.letter, option.text)
}

/// Build the prompt payload for one question.
///
/// `position` is 1-based within the current pass; `total` is the pass
/// length (pool size in linear mode, exam size in exam mode).
pub fn to_client_state(question: &Question, tally: Tally, position: usize, total: usize) -> Value {
    json!({
        "question_id": question.id.0,
        "topic": question.topic,
        "stem": question.stem,
        "options": question.options.iter().map(labeled_option).collect::<Vec<_>>(),
        "progress": { "current": position, "total": total },
        "stats": {
            "correct": tally.correct,
            "incorrect": tally.incorrect,
            "answered": tally.answered(),
            "accuracy": tally.accuracy(),
        }
    })
}

/// Build the reveal payload shown after the user picks `chosen`.
pub fn to_reveal_state(question: &Question, chosen: OptionLetter) -> Value {
    json!({
        "question_id": question.id.0,
        "chosen": chosen.to_string(),
        "correct": question.correct_letter.to_string(),
        "is_correct": question.is_correct(chosen),
        "explanation": question.explanation,
    })
}
