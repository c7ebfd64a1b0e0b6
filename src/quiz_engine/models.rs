use std::fmt;
use serde::{Deserialize, Serialize};

/// Topic sentinel used when a row carries no classification.
pub const UNSPECIFIED_TOPIC: &str = "unspecified";

// ---------------------------------------------------------------------------
// Question primitives
// ---------------------------------------------------------------------------

/// Stable question identifier — the row position in the source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Option label letter. Banks use 2 to 5 options, so only A through E exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLetter {
    /// All letters in label order.
    pub const ALL: [OptionLetter; 5] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
        OptionLetter::E,
    ];

    /// Case-insensitive conversion from a single character.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            'E' => Some(OptionLetter::E),
            _   => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
            OptionLetter::E => 'E',
        }
    }

    /// The letter that follows this one in label order, `None` after E.
    pub fn next(self) -> Option<Self> {
        match self {
            OptionLetter::A => Some(OptionLetter::B),
            OptionLetter::B => Some(OptionLetter::C),
            OptionLetter::C => Some(OptionLetter::D),
            OptionLetter::D => Some(OptionLetter::E),
            OptionLetter::E => None,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One labeled candidate answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub letter: OptionLetter,
    pub text: String,
}

/// A fully validated question. Either every invariant holds — non-empty
/// stem, 2..=5 options with unique letters in appearance order, correct
/// letter present among them — or the source row was rejected at parse
/// time. No partially populated value ever reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Clinical vignette and question text, newlines normalized to spaces.
    pub stem: String,
    pub options: Vec<AnswerOption>,
    pub correct_letter: OptionLetter,
    /// Feedback text shown after answering. May be empty.
    pub explanation: String,
    /// Classification string, [`UNSPECIFIED_TOPIC`] when the row had none.
    pub topic: String,
}

impl Question {
    pub fn option(&self, letter: OptionLetter) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.letter == letter)
    }

    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        self.correct_letter == letter
    }
}

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One already-loaded spreadsheet row. Fetching and sheet parsing live with
/// the caller; this crate only consumes the field values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// The free-text question cell: stem, inlined options, and possibly an
    /// inlined answer marker and explanation.
    pub text: String,
    /// Separate correct-answer column, when the sheet has one.
    pub answer: Option<String>,
    /// Separate feedback column; overrides any inline explanation.
    pub explanation: Option<String>,
    pub topic: Option<String>,
}

impl RawRow {
    pub fn new(text: impl Into<String>) -> Self {
        RawRow {
            text: text.into(),
            answer: None,
            explanation: None,
            topic: None,
        }
    }
}

/// Where the correct-answer letter for a dataset comes from. Sheets are
/// inconsistent: some inline a "Respuesta: X" marker in the question cell,
/// others carry a dedicated answer column. The caller picks one mode per
/// dataset; the two are never mixed implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKeySource {
    /// Extract the letter from the inline marker; rows without one are
    /// rejected.
    InlineMarker,
    /// Take the letter from the row's answer column; rows without a usable
    /// column value are rejected. Inline markers are still stripped from
    /// the displayed text but their letter is ignored.
    Column,
}

// ---------------------------------------------------------------------------
// Session types
// ---------------------------------------------------------------------------

/// How the next question is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyMode {
    /// Walk the pool in order once; signals completion at the end.
    Linear,
    /// Uniform draw with replacement; never completes.
    Random,
    /// Weighted toward previously missed questions. See
    /// [`FAILED_FIRST_WEIGHT`](crate::quiz_engine::session::FAILED_FIRST_WEIGHT).
    SpacedRepetition,
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyMode::Linear           => write!(f, "linear"),
            StudyMode::Random           => write!(f, "random"),
            StudyMode::SpacedRepetition => write!(f, "spaced repetition"),
        }
    }
}

/// Ordinal difficulty grade 0..=4 optionally reported with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Grade(u8);

impl Grade {
    pub const MAX: u8 = 4;

    /// Build a grade, clamping values above the scale.
    pub fn new(value: u8) -> Self {
        Grade(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Per-question answer state. Re-answering overwrites the previous entry —
/// last answer wins, nothing is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Unseen,
    Graded { correct: bool, grade: Option<Grade> },
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Graded { correct: true, .. })
    }

    pub fn is_incorrect(self) -> bool {
        matches!(self, Outcome::Graded { correct: false, .. })
    }
}

/// Accuracy at or above this is an [`PerformanceBand::Excellent`] session.
pub const EXCELLENT_ACCURACY: f64 = 80.0;
/// Accuracy at or above this is a [`PerformanceBand::Good`] session.
pub const GOOD_ACCURACY: f64 = 60.0;

/// Coarse end-of-session performance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceBand {
    Excellent,
    Good,
    KeepPracticing,
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Excellent      => write!(f, "excellent"),
            PerformanceBand::Good           => write!(f, "good"),
            PerformanceBand::KeepPracticing => write!(f, "keep practicing"),
        }
    }
}

/// Running correct/incorrect counters. Always equal to the counts over the
/// current history — re-grading a question moves it between counters
/// instead of adding a second entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub incorrect: usize,
}

impl Tally {
    pub fn answered(self) -> usize {
        self.correct + self.incorrect
    }

    /// Percentage of answered questions that are currently correct,
    /// 0.0 before anything has been answered.
    pub fn accuracy(self) -> f64 {
        let answered = self.answered();
        if answered == 0 {
            return 0.0;
        }
        self.correct as f64 / answered as f64 * 100.0
    }

    pub fn performance_band(self) -> PerformanceBand {
        let accuracy = self.accuracy();
        if accuracy >= EXCELLENT_ACCURACY {
            PerformanceBand::Excellent
        } else if accuracy >= GOOD_ACCURACY {
            PerformanceBand::Good
        } else {
            PerformanceBand::KeepPracticing
        }
    }
}
