use std::collections::BTreeMap;

use rand::Rng;

use crate::engine::composer::{DEFAULT_MAX_ATTEMPTS, GroupComposer};
use crate::engine::composition::CompositionValidator;
use crate::engine::group::Session;
use crate::engine::pair_history::PairHistory;
use crate::engine::planner::{self, GroupPlan};
use crate::error::Result;
use crate::roster::Student;

/// What a run produced besides the groups themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub plan: GroupPlan,
    pub attempts: usize,
    /// Pairing count -> number of unordered pairs with that count, after the
    /// session was recorded.
    pub histogram: BTreeMap<u32, usize>,
}

/// Runs one full group formation: plan, compose, then record the pairings.
/// Loading and saving the history is left to the caller.
pub struct SessionOrchestrator<'v> {
    validator: &'v dyn CompositionValidator,
    max_attempts: usize,
}

impl<'v> SessionOrchestrator<'v> {
    pub fn new(validator: &'v dyn CompositionValidator) -> Self {
        Self {
            validator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Form groups without recording them. Students not yet in `history` are
    /// registered with zero pairings; no existing count changes.
    pub fn preview<'a, R: Rng + ?Sized>(
        &self,
        pool: &'a [Student],
        target_size: usize,
        history: &mut PairHistory,
        rng: &mut R,
    ) -> Result<(Session<'a>, GroupPlan)> {
        let plan = planner::plan(pool.len(), target_size)?;
        tracing::info!(students = pool.len(), target_size, plan = %plan, "planning session");

        // Students new to the ledger start with zero pairings.
        for student in pool {
            if history.register(&student.id) {
                tracing::debug!(student = %student, "registered new student in history");
            }
        }

        let members: Vec<&'a Student> = pool.iter().collect();
        let session = GroupComposer::new(self.validator)
            .with_max_attempts(self.max_attempts)
            .compose(&members, &plan, history, rng)?;
        Ok((session, plan))
    }

    pub fn run<'a, R: Rng + ?Sized>(
        &self,
        pool: &'a [Student],
        target_size: usize,
        history: &mut PairHistory,
        rng: &mut R,
    ) -> Result<(Session<'a>, SessionReport)> {
        let (session, plan) = self.preview(pool, target_size, history, rng)?;

        for group in session.groups() {
            history.increment_all_pairs(group.ids())?;
        }

        let histogram = history.histogram();
        tracing::info!("Histogram of Pairing Frequency");
        for (times, pairs) in &histogram {
            tracing::info!("{times} = {pairs}");
        }

        let report = SessionReport {
            plan,
            attempts: session.attempts(),
            histogram,
        };
        Ok((session, report))
    }
}
