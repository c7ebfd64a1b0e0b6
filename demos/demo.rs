//! Full demo of the quiz engine: load a small bank, run a linear pass,
//! then a spaced-repetition re-study pass.
//!
//! Run with: `cargo run --example demo`
//!
//! This example shows how `med_quiz_engine` works end to end:
//!
//! 1. **Bank loading** — a handful of raw cells in deliberately mixed
//!    formats (delimiters `)`, `.`, `-`; marker before, between, and after
//!    the options; a multi-line option body) plus one malformed row that
//!    lands in the rejected list instead of aborting the load.
//! 2. **Linear pass** — every question in sheet order, answered by a tiny
//!    scripted "student" that gets some wrong, with the prompt and reveal
//!    payloads printed the way a web client would receive them.
//! 3. **Spaced-repetition pass** — a few draws showing the bias toward the
//!    questions missed in the first pass.
//!
//! ## Key concepts demonstrated
//!
//! - `SessionState::new(Some(seed))` makes every shuffle and draw
//!   reproducible.
//! - `QuestionBank::rejected()` reports bad rows with their positions.
//! - `Ok(None)` from `next()` in linear mode signals session completion.

use med_quiz_engine::{
    to_client_state, to_reveal_state, AnswerKeySource, OptionLetter, QuestionBank,
    RawRow, SessionState, StudyMode,
};

fn sample_rows() -> Vec<RawRow> {
    vec![
        RawRow {
            text: "A 58-year-old smoker has sudden tearing chest pain radiating to the back. \
                   Most likely diagnosis? A) Aortic dissection B) Myocardial infarction \
                   C) Pericarditis D) Pneumothorax Respuesta: A The tearing quality and \
                   radiation to the back are classic for dissection."
                .into(),
            answer: None,
            explanation: None,
            topic: Some("cardiology".into()),
        },
        RawRow {
            text: "First-line treatment for uncomplicated cystitis? A) Nitrofurantoin \
                   B. Ciprofloxacin C- Amoxicillin D) Ceftriaxone Correcta: A"
                .into(),
            answer: None,
            explanation: Some("Fluoroquinolones are reserved for complicated cases.".into()),
            topic: Some("infectology".into()),
        },
        RawRow {
            text: "Respuesta: C Which electrolyte disturbance causes peaked T waves?\n\
                   A) Hyponatremia B) Hypokalemia C) Hyperkalemia\nD) Hypocalcemia"
                .into(),
            answer: None,
            explanation: None,
            topic: Some("cardiology".into()),
        },
        // Malformed on purpose: no options at all.
        RawRow::new("Free-text note left in the sheet by a reviewer, not a question."),
    ]
}

/// Scripted answers: wrong on the first question, right on the rest.
fn scripted_answer(index: usize, correct: OptionLetter) -> OptionLetter {
    if index == 0 {
        if correct == OptionLetter::A { OptionLetter::B } else { OptionLetter::A }
    } else {
        correct
    }
}

fn main() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker)
        .expect("sample rows contain valid questions");

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Loaded {} questions, rejected {} rows", bank.len(), bank.rejected().len());
    for rejected in bank.rejected() {
        println!("    row {}: {}", rejected.row, rejected.error);
    }

    // ── linear pass ─────────────────────────────────────────────────────
    let pool = bank.pool();
    let mut session = SessionState::new(Some(42));

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Linear pass ({} questions)", pool.len());

    let mut position = 0usize;
    while let Some(id) = session.next(&pool, StudyMode::Linear).expect("pool is not empty") {
        position += 1;
        let question = bank.get(id).expect("id came from this bank");

        let prompt = to_client_state(question, session.tally(), position, pool.len());
        println!();
        println!("  [{}] {}", prompt["progress"]["current"], question.stem);
        for option in prompt["options"].as_array().expect("options is an array") {
            println!("      {}", option.as_str().expect("options are strings"));
        }

        let chosen = scripted_answer(position - 1, question.correct_letter);
        session.record_outcome(id, question.is_correct(chosen), None);

        let reveal = to_reveal_state(question, chosen);
        let verdict = if reveal["is_correct"] == true { "correct" } else { "wrong" };
        println!("      chose {chosen} -> {verdict} (answer: {})", question.correct_letter);
        if !question.explanation.is_empty() {
            println!("      why: {}", question.explanation);
        }
    }

    let tally = session.tally();
    println!();
    println!(
        "  Done: {} correct, {} incorrect, accuracy {:.1}% ({})",
        tally.correct,
        tally.incorrect,
        tally.accuracy(),
        tally.performance_band(),
    );

    // ── spaced-repetition pass ──────────────────────────────────────────
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Spaced-repetition draws (missed: {:?})", session.failed_ids());
    for _ in 0..8 {
        let id = session
            .next(&pool, StudyMode::SpacedRepetition)
            .expect("pool is not empty")
            .expect("spaced repetition never completes");
        let question = bank.get(id).expect("id came from this bank");
        let mark = if session.outcome(id).is_incorrect() { "*" } else { " " };
        println!("    [{mark}] {} {}", id, question.stem);
    }
}
