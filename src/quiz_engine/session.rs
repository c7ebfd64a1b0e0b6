//! Per-session outcome history and next-question selection.
//!
//! One [`SessionState`] belongs to one interactive user for the lifetime of
//! one study session. All access is sequential — answer, advance, answer —
//! so there is no locking; a server embedding this crate keeps one instance
//! per session token and never shares it.

use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::quiz_engine::errors::EmptyPoolError;
use crate::quiz_engine::models::{Grade, Outcome, QuestionId, StudyMode, Tally};

/// Probability that a spaced-repetition draw samples from the previously
/// missed subset instead of the full pool. With an empty missed subset the
/// draw always falls back to the full pool.
///
/// This is a stateless priority scheme — no review intervals, no calendar.
/// A question missed once stays boosted until it is answered correctly,
/// nothing more.
pub const FAILED_FIRST_WEIGHT: f64 = 0.5;

/// Mutable study-session state: outcome history, running tally, and the
/// linear-mode cursor. Created empty, discarded (or externally persisted)
/// at session end — the crate itself owns no persistence.
pub struct SessionState {
    rng: StdRng,
    history: HashMap<QuestionId, Outcome>,
    tally: Tally,
    cursor: usize,
    current: Option<QuestionId>,
}

impl SessionState {
    /// A seeded session replays the exact same selection sequence — useful
    /// for tests and for reproducing a reported session.
    pub fn new(rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        SessionState {
            rng,
            history: HashMap::new(),
            tally: Tally::default(),
            cursor: 0,
            current: None,
        }
    }

    /// Pick the next question id from `pool`.
    ///
    /// `Ok(None)` means the linear pass is complete — the pool is never
    /// silently wrapped. Random and spaced-repetition modes never complete;
    /// the caller decides when to stop.
    pub fn next(
        &mut self,
        pool: &[QuestionId],
        mode: StudyMode,
    ) -> Result<Option<QuestionId>, EmptyPoolError> {
        if pool.is_empty() {
            return Err(EmptyPoolError);
        }
        let picked = match mode {
            StudyMode::Linear => {
                if self.cursor >= pool.len() {
                    self.current = None;
                    return Ok(None);
                }
                let id = pool[self.cursor];
                self.cursor += 1;
                id
            }
            StudyMode::Random => pool[self.rng.gen_range(0..pool.len())],
            StudyMode::SpacedRepetition => {
                let failed: Vec<QuestionId> = pool
                    .iter()
                    .copied()
                    .filter(|id| self.outcome(*id).is_incorrect())
                    .collect();
                if !failed.is_empty() && self.rng.gen_bool(FAILED_FIRST_WEIGHT) {
                    failed[self.rng.gen_range(0..failed.len())]
                } else {
                    pool[self.rng.gen_range(0..pool.len())]
                }
            }
        };
        self.current = Some(picked);
        Ok(Some(picked))
    }

    /// Record an answer. Last write wins: re-grading replaces the previous
    /// entry and moves the tally counter instead of double-counting. Ids
    /// outside the active pool are accepted — pools may be filtered by
    /// topic while history spans the whole bank. A question timed out by
    /// the UI shell is reported here as `correct = false`.
    pub fn record_outcome(&mut self, id: QuestionId, correct: bool, grade: Option<Grade>) {
        let prev = self.history.insert(id, Outcome::Graded { correct, grade });
        if let Some(Outcome::Graded { correct: was_correct, .. }) = prev {
            if was_correct {
                self.tally.correct -= 1;
            } else {
                self.tally.incorrect -= 1;
            }
        }
        if correct {
            self.tally.correct += 1;
        } else {
            self.tally.incorrect += 1;
        }
    }

    /// Current answer state for `id`.
    pub fn outcome(&self, id: QuestionId) -> Outcome {
        self.history.get(&id).copied().unwrap_or(Outcome::Unseen)
    }

    /// The question currently presented, if any.
    pub fn current(&self) -> Option<QuestionId> {
        self.current
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Plain id → outcome mapping, sufficient for external persistence.
    pub fn history(&self) -> &HashMap<QuestionId, Outcome> {
        &self.history
    }

    /// Ids currently graded incorrect — the re-study set, in id order.
    pub fn failed_ids(&self) -> Vec<QuestionId> {
        let mut ids: Vec<QuestionId> = self
            .history
            .iter()
            .filter(|(_, outcome)| outcome.is_incorrect())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Fixed pool order for a shuffled linear pass, drawn once per session.
    pub fn shuffled_pool(&mut self, pool: &[QuestionId]) -> Vec<QuestionId> {
        let mut order = pool.to_vec();
        // Fisher-Yates shuffle
        for i in (1..order.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            order.swap(i, j);
        }
        order
    }

    /// Draw `n` distinct ids for a fixed-size mock exam (fewer when the
    /// pool is smaller), then drive them in [`StudyMode::Linear`].
    pub fn exam_sample(&mut self, pool: &[QuestionId], n: usize) -> Vec<QuestionId> {
        let mut order = self.shuffled_pool(pool);
        order.truncate(n.min(order.len()));
        order
    }

    /// Wipe history, tally, and cursor for a fresh pass. The RNG keeps its
    /// stream so a seeded session stays reproducible end to end.
    pub fn reset(&mut self) {
        self.history.clear();
        self.tally = Tally::default();
        self.cursor = 0;
        self.current = None;
    }
}
