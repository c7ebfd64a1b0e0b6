//! Unit tests for the `med_quiz_engine` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Parser round-trip | Canonical cell → stem, ordered options, correct letter |
//! | Format tolerance | Mixed delimiters, multi-line bodies, marker in any position |
//! | Rejection | Each `ParseError` variant on its specific malformed input |
//! | Answer-key modes | Inline marker vs external column, no silent "A" default |
//! | Bank | Per-row rejection, zero-valid failure, stable ids, topic pools |
//! | Selector | Linear order + completion, random bounds, SR bias frequency |
//! | History | Last-write-wins regrading, out-of-pool ids, tally consistency |
//! | Adapter | Prompt and reveal payload shapes |

use crate::quiz_engine::{
    parse_cell, AnswerKey, AnswerKeySource, EmptyPoolError, Grade, LoadError,
    OptionLetter, Outcome, ParseError, PerformanceBand, QuestionBank, QuestionId,
    RawRow, SessionState, StudyMode, Tally, FAILED_FIRST_WEIGHT,
};
use crate::{to_client_state, to_reveal_state};

// ── helpers ──────────────────────────────────────────────────────────────────

/// A canonical four-option cell with a trailing marker.
const CANONICAL: &str = "A 60-year-old woman presents with acute dyspnea. Most likely diagnosis? \
A) Pulmonary embolism B) Pneumothorax C) Asthma D) Pneumonia Respuesta: B";

fn inline(text: &str) -> Result<crate::ParsedCell, ParseError> {
    parse_cell(text, AnswerKey::Inline)
}

fn option_texts(cell: &crate::ParsedCell) -> Vec<(OptionLetter, &str)> {
    cell.options.iter().map(|o| (o.letter, o.text.as_str())).collect()
}

fn ids(ns: &[u32]) -> Vec<QuestionId> {
    ns.iter().map(|&n| QuestionId(n)).collect()
}

fn sample_rows() -> Vec<RawRow> {
    vec![
        RawRow {
            text: "First stem? A) uno B) dos C) tres Respuesta: A".into(),
            answer: None,
            explanation: None,
            topic: Some("cardiology".into()),
        },
        RawRow::new("Second stem? A) uno B) dos Respuesta: B"),
        RawRow {
            text: "Third stem? A) uno B) dos C) tres D) cuatro Respuesta: D".into(),
            answer: None,
            explanation: Some("Column feedback.".into()),
            topic: Some("Cardiology".into()),
        },
    ]
}

// ── parser: round-trip structure ─────────────────────────────────────────────

#[test]
fn canonical_cell_round_trips() {
    let cell = inline(CANONICAL).unwrap();
    assert_eq!(
        cell.stem,
        "A 60-year-old woman presents with acute dyspnea. Most likely diagnosis?"
    );
    assert_eq!(
        option_texts(&cell),
        vec![
            (OptionLetter::A, "Pulmonary embolism"),
            (OptionLetter::B, "Pneumothorax"),
            (OptionLetter::C, "Asthma"),
            (OptionLetter::D, "Pneumonia"),
        ]
    );
    assert_eq!(cell.correct_letter, OptionLetter::B);
    assert_eq!(cell.explanation, None);
}

#[test]
fn two_option_and_five_option_cells_are_valid() {
    let two = inline("Stem? A) yes B) no Respuesta: A").unwrap();
    assert_eq!(two.options.len(), 2);

    let five = inline("Stem? A) a B) b C) c D) d E) e Respuesta: E").unwrap();
    assert_eq!(five.options.len(), 5);
    assert_eq!(five.correct_letter, OptionLetter::E);
}

// ── parser: format tolerance ─────────────────────────────────────────────────

#[test]
fn mixed_delimiters_parse_identically() {
    let mixed = inline("Stem? A) uno B. dos C- tres D) cuatro Respuesta: C").unwrap();
    let plain = inline("Stem? A) uno B) dos C) tres D) cuatro Respuesta: C").unwrap();
    assert_eq!(option_texts(&mixed), option_texts(&plain));
    assert_eq!(mixed.correct_letter, plain.correct_letter);
}

#[test]
fn multi_line_option_body_is_captured_whole() {
    let cell = inline(
        "Stem?\nA) first choice B) a long option that\nContinues on the next line C) third Respuesta: C",
    )
    .unwrap();
    assert_eq!(cell.options.len(), 3);
    assert_eq!(
        cell.options[1].text,
        "a long option that Continues on the next line"
    );
}

#[test]
fn marker_position_does_not_change_the_result() {
    let before = inline("Stem here Respuesta: B A) uno B) dos C) tres").unwrap();
    let between = inline("Stem here A) uno Respuesta: B B) dos C) tres").unwrap();
    let after = inline("Stem here A) uno B) dos C) tres Respuesta: B").unwrap();

    for cell in [&before, &between, &after] {
        assert_eq!(cell.correct_letter, OptionLetter::B);
        assert_eq!(cell.stem, "Stem here");
        assert_eq!(cell.options.len(), 3);
    }
    // The marker never leaks into displayed text, wherever it sat.
    assert_eq!(before.options[0].text, "uno");
    assert_eq!(between.options[0].text, "uno");
}

#[test]
fn trailing_marker_splits_off_the_explanation() {
    let cell = inline(
        "Stem? A) uno B) dos Respuesta: A PE is the classic post-op cause of sudden dyspnea.",
    )
    .unwrap();
    assert_eq!(cell.options[1].text, "dos");
    assert_eq!(
        cell.explanation.as_deref(),
        Some("PE is the classic post-op cause of sudden dyspnea.")
    );
}

#[test]
fn trailing_text_without_marker_stays_in_the_last_option() {
    // With no marker the tail is ambiguous; it is kept as option text
    // rather than silently discarded.
    let cell = parse_cell(
        "Stem? A) uno B) dos plus trailing words",
        AnswerKey::External(OptionLetter::A),
    )
    .unwrap();
    assert_eq!(cell.options[1].text, "dos plus trailing words");
    assert_eq!(cell.explanation, None);
}

// ── parser: rejection ────────────────────────────────────────────────────────

#[test]
fn single_label_is_rejected() {
    assert_eq!(
        inline("Stem with only A) one option").unwrap_err(),
        ParseError::NoOptionsFound
    );
}

#[test]
fn prose_without_labels_is_rejected() {
    assert_eq!(
        inline("Plain narrative text with no options at all").unwrap_err(),
        ParseError::NoOptionsFound
    );
}

#[test]
fn marker_naming_an_absent_option_is_rejected() {
    assert_eq!(
        inline("Stem? A) a B) b C) c D) d Respuesta: E").unwrap_err(),
        ParseError::AnswerKeyNotInOptions(OptionLetter::E)
    );
}

#[test]
fn cell_starting_with_a_label_has_no_stem() {
    assert_eq!(
        inline("A) a B) b Respuesta: A").unwrap_err(),
        ParseError::EmptyStem
    );
}

#[test]
fn missing_marker_is_an_error_not_a_default() {
    // The known defect class in the ad hoc parsers this replaces: an
    // unparseable key silently became "A". Here it is an explicit error.
    assert_eq!(
        inline("Stem? A) a B) b").unwrap_err(),
        ParseError::MissingAnswerKey
    );
}

// ── parser: answer-key modes ─────────────────────────────────────────────────

#[test]
fn external_key_wins_over_inline_marker() {
    // Column mode never consults the marker letter, but still strips it.
    let cell = parse_cell(
        "Stem? A) uno B) dos Respuesta: B",
        AnswerKey::External(OptionLetter::A),
    )
    .unwrap();
    assert_eq!(cell.correct_letter, OptionLetter::A);
    assert_eq!(cell.options[1].text, "dos");
}

#[test]
fn external_key_must_still_name_a_parsed_option() {
    assert_eq!(
        parse_cell("Stem? A) a B) b", AnswerKey::External(OptionLetter::D)).unwrap_err(),
        ParseError::AnswerKeyNotInOptions(OptionLetter::D)
    );
}

// ── bank loading ─────────────────────────────────────────────────────────────

#[test]
fn bank_keeps_row_positions_as_ids() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker).unwrap();
    assert_eq!(bank.len(), 3);
    assert_eq!(bank.pool(), ids(&[0, 1, 2]));
    assert_eq!(bank.get(QuestionId(1)).unwrap().stem, "Second stem?");
}

#[test]
fn bad_rows_are_collected_not_fatal() {
    let mut rows = sample_rows();
    rows.insert(1, RawRow::new("no options in this row at all"));

    let bank = QuestionBank::from_rows(&rows, AnswerKeySource::InlineMarker).unwrap();
    assert_eq!(bank.len(), 3);
    assert_eq!(bank.rejected().len(), 1);
    assert_eq!(bank.rejected()[0].row, 1);
    assert_eq!(bank.rejected()[0].error, ParseError::NoOptionsFound);
    // Ids still reflect sheet positions, skipping the rejected row.
    assert_eq!(bank.pool(), ids(&[0, 2, 3]));
}

#[test]
fn zero_valid_rows_is_a_single_clear_failure() {
    let rows = vec![
        RawRow::new("nothing here"),
        RawRow::new("A) only one option"),
    ];
    let err = QuestionBank::from_rows(&rows, AnswerKeySource::InlineMarker).unwrap_err();
    let LoadError::NoValidQuestions { rejected } = err;
    assert_eq!(rejected.len(), 2);
}

#[test]
fn column_mode_reads_the_answer_column() {
    let rows = vec![
        RawRow {
            text: "Stem? A) uno B) dos".into(),
            answer: Some("b".into()),
            explanation: None,
            topic: None,
        },
        // Marker present but ignored in column mode.
        RawRow {
            text: "Stem? A) uno B) dos Respuesta: B".into(),
            answer: Some("A".into()),
            explanation: None,
            topic: None,
        },
        // No usable column value: rejected, not defaulted.
        RawRow::new("Stem? A) uno B) dos"),
    ];
    let bank = QuestionBank::from_rows(&rows, AnswerKeySource::Column).unwrap();
    assert_eq!(bank.len(), 2);
    assert_eq!(bank.get(QuestionId(0)).unwrap().correct_letter, OptionLetter::B);
    assert_eq!(bank.get(QuestionId(1)).unwrap().correct_letter, OptionLetter::A);
    assert_eq!(bank.rejected()[0].error, ParseError::MissingAnswerKey);
}

#[test]
fn explanation_column_outranks_inline_explanation() {
    let rows = vec![RawRow {
        text: "Stem? A) uno B) dos Respuesta: A inline explanation here".into(),
        answer: None,
        explanation: Some("Column feedback.".into()),
        topic: None,
    }];
    let bank = QuestionBank::from_rows(&rows, AnswerKeySource::InlineMarker).unwrap();
    assert_eq!(bank.get(QuestionId(0)).unwrap().explanation, "Column feedback.");
}

#[test]
fn inline_explanation_is_used_when_no_column_exists() {
    let rows = vec![RawRow::new("Stem? A) uno B) dos Respuesta: A inline explanation here")];
    let bank = QuestionBank::from_rows(&rows, AnswerKeySource::InlineMarker).unwrap();
    assert_eq!(
        bank.get(QuestionId(0)).unwrap().explanation,
        "inline explanation here"
    );
}

#[test]
fn topic_defaults_to_the_sentinel_and_pools_filter_case_insensitively() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker).unwrap();
    assert_eq!(bank.get(QuestionId(1)).unwrap().topic, "unspecified");
    assert_eq!(bank.pool_for_topic("CARDIOLOGY"), ids(&[0, 2]));
    assert_eq!(bank.pool_for_topic("nephrology"), ids(&[]));
}

// ── selector: linear mode ────────────────────────────────────────────────────

#[test]
fn linear_mode_walks_the_pool_in_order_then_completes() {
    let pool = ids(&[10, 11, 12]);
    let mut session = SessionState::new(Some(1));

    assert_eq!(session.next(&pool, StudyMode::Linear).unwrap(), Some(QuestionId(10)));
    assert_eq!(session.current(), Some(QuestionId(10)));
    assert_eq!(session.next(&pool, StudyMode::Linear).unwrap(), Some(QuestionId(11)));
    assert_eq!(session.next(&pool, StudyMode::Linear).unwrap(), Some(QuestionId(12)));

    // Completion is signalled, never wrapped.
    assert_eq!(session.next(&pool, StudyMode::Linear).unwrap(), None);
    assert_eq!(session.current(), None);
    assert_eq!(session.next(&pool, StudyMode::Linear).unwrap(), None);
}

#[test]
fn empty_pool_is_an_error_in_every_mode() {
    let mut session = SessionState::new(Some(1));
    for mode in [StudyMode::Linear, StudyMode::Random, StudyMode::SpacedRepetition] {
        assert_eq!(session.next(&[], mode), Err(EmptyPoolError));
    }
}

// ── selector: random mode ────────────────────────────────────────────────────

#[test]
fn random_mode_stays_in_the_pool_and_never_completes() {
    let pool = ids(&[3, 4, 5]);
    let mut session = SessionState::new(Some(7));
    for _ in 0..200 {
        let id = session.next(&pool, StudyMode::Random).unwrap().unwrap();
        assert!(pool.contains(&id));
    }
}

// ── selector: spaced-repetition bias ─────────────────────────────────────────

#[test]
fn spaced_repetition_biases_toward_failed_questions() {
    let pool = ids(&[0, 1, 2]);
    let mut session = SessionState::new(Some(1234));
    session.record_outcome(QuestionId(0), false, None);
    session.record_outcome(QuestionId(1), true, None);
    session.record_outcome(QuestionId(2), true, None);

    let trials = 10_000u32;
    let mut failed_hits = 0u32;
    for _ in 0..trials {
        let id = session.next(&pool, StudyMode::SpacedRepetition).unwrap().unwrap();
        if id == QuestionId(0) {
            failed_hits += 1;
        }
    }

    // Expected frequency: the weighting probability plus the uniform
    // background rate, FAILED_FIRST_WEIGHT + (1 - FAILED_FIRST_WEIGHT) / 3.
    let expected = FAILED_FIRST_WEIGHT + (1.0 - FAILED_FIRST_WEIGHT) / 3.0;
    let observed = f64::from(failed_hits) / f64::from(trials);
    assert!(
        (observed - expected).abs() < 0.03,
        "observed {observed:.3}, expected ~{expected:.3}"
    );
}

#[test]
fn spaced_repetition_falls_back_to_uniform_without_failures() {
    let pool = ids(&[0, 1, 2]);
    let mut session = SessionState::new(Some(99));
    session.record_outcome(QuestionId(0), true, None);

    let trials = 9_000u32;
    let mut hits = [0u32; 3];
    for _ in 0..trials {
        let id = session.next(&pool, StudyMode::SpacedRepetition).unwrap().unwrap();
        hits[id.0 as usize] += 1;
    }
    for (i, &h) in hits.iter().enumerate() {
        let freq = f64::from(h) / f64::from(trials);
        assert!(
            (freq - 1.0 / 3.0).abs() < 0.03,
            "question {i} drawn with frequency {freq:.3}, expected ~0.333"
        );
    }
}

#[test]
fn seeded_sessions_replay_identical_draw_sequences() {
    let pool = ids(&[0, 1, 2, 3, 4]);
    let draw = |seed: u64| -> Vec<QuestionId> {
        let mut session = SessionState::new(Some(seed));
        session.record_outcome(QuestionId(2), false, None);
        (0..50)
            .map(|_| session.next(&pool, StudyMode::SpacedRepetition).unwrap().unwrap())
            .collect()
    };
    assert_eq!(draw(42), draw(42));
    assert_ne!(draw(42), draw(43));
}

// ── history and tally ────────────────────────────────────────────────────────

#[test]
fn regrading_is_last_write_wins() {
    let mut session = SessionState::new(Some(1));
    session.record_outcome(QuestionId(0), false, None);
    session.record_outcome(QuestionId(0), true, None);

    assert_eq!(
        session.outcome(QuestionId(0)),
        Outcome::Graded { correct: true, grade: None }
    );
    // The tally reflects current state, not the historical answer count.
    assert_eq!(session.tally(), Tally { correct: 1, incorrect: 0 });
}

#[test]
fn outcomes_for_ids_outside_the_pool_are_accepted() {
    let mut session = SessionState::new(Some(1));
    session.record_outcome(QuestionId(999), false, Some(Grade::new(9)));
    assert!(session.outcome(QuestionId(999)).is_incorrect());
    assert_eq!(session.failed_ids(), ids(&[999]));
    // Grades clamp to the 0..=4 scale.
    match session.outcome(QuestionId(999)) {
        Outcome::Graded { grade: Some(g), .. } => assert_eq!(g.value(), Grade::MAX),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn accuracy_and_performance_bands() {
    assert_eq!(Tally::default().accuracy(), 0.0);
    assert_eq!(Tally::default().performance_band(), PerformanceBand::KeepPracticing);

    let four_of_five = Tally { correct: 4, incorrect: 1 };
    assert!((four_of_five.accuracy() - 80.0).abs() < f64::EPSILON);
    assert_eq!(four_of_five.performance_band(), PerformanceBand::Excellent);

    let three_of_five = Tally { correct: 3, incorrect: 2 };
    assert_eq!(three_of_five.performance_band(), PerformanceBand::Good);

    let one_of_four = Tally { correct: 1, incorrect: 3 };
    assert_eq!(one_of_four.performance_band(), PerformanceBand::KeepPracticing);
}

// ── client adapter ───────────────────────────────────────────────────────────

#[test]
fn client_state_payload_is_render_ready() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker).unwrap();
    let question = bank.get(QuestionId(0)).unwrap();
    let tally = Tally { correct: 3, incorrect: 1 };

    let payload = to_client_state(question, tally, 1, 3);
    assert_eq!(payload["question_id"], 0);
    assert_eq!(payload["topic"], "cardiology");
    assert_eq!(payload["options"][0], "A) uno");
    assert_eq!(payload["options"][2], "C) tres");
    assert_eq!(payload["progress"]["current"], 1);
    assert_eq!(payload["progress"]["total"], 3);
    assert_eq!(payload["stats"]["answered"], 4);
    assert_eq!(payload["stats"]["accuracy"], 75.0);
}

#[test]
fn reveal_payload_reports_correctness_and_explanation() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker).unwrap();
    let question = bank.get(QuestionId(2)).unwrap();

    let wrong = to_reveal_state(question, OptionLetter::A);
    assert_eq!(wrong["is_correct"], false);
    assert_eq!(wrong["correct"], "D");
    assert_eq!(wrong["explanation"], "Column feedback.");

    let right = to_reveal_state(question, OptionLetter::D);
    assert_eq!(right["is_correct"], true);
}

// ── end to end ───────────────────────────────────────────────────────────────

#[test]
fn full_session_over_a_loaded_bank() {
    let bank = QuestionBank::from_rows(&sample_rows(), AnswerKeySource::InlineMarker).unwrap();
    let pool = bank.pool();
    let mut session = SessionState::new(Some(5));

    while let Some(id) = session.next(&pool, StudyMode::Linear).unwrap() {
        let question = bank.get(id).unwrap();
        // Answer the first question wrong, the rest right.
        let chosen = if id == QuestionId(0) {
            question.options.iter().find(|o| o.letter != question.correct_letter).unwrap().letter
        } else {
            question.correct_letter
        };
        session.record_outcome(id, question.is_correct(chosen), None);
    }

    assert_eq!(session.tally(), Tally { correct: 2, incorrect: 1 });
    assert_eq!(session.failed_ids(), ids(&[0]));

    // The re-study pass sees only the failed question.
    let restudy = session.failed_ids();
    let id = session.next(&restudy, StudyMode::Random).unwrap().unwrap();
    assert_eq!(id, QuestionId(0));
}
