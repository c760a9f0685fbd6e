use crate::engine::planner::GroupPlan;
use crate::roster::{Gender, Student};

/// Rule every finished group has to satisfy.
pub trait CompositionValidator {
    fn name(&self) -> &'static str;

    fn is_valid(&self, members: &[&Student]) -> bool;

    /// Whether some assignment of `pool` to the groups in `plan` can pass
    /// `is_valid` for every group. Rules that cannot tell answer `true` and
    /// rely on the composer's attempt limit.
    fn is_satisfiable(&self, _plan: &GroupPlan, _pool: &[&Student]) -> bool {
        true
    }
}

/// Accepts every group.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyComposition;

impl CompositionValidator for AnyComposition {
    fn name(&self) -> &'static str {
        "any"
    }

    fn is_valid(&self, _members: &[&Student]) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenderTally {
    pub female: usize,
    pub male: usize,
}

impl GenderTally {
    pub fn of(members: &[&Student]) -> Self {
        let mut tally = Self::default();
        for student in members {
            match student.gender {
                Some(Gender::Female) => tally.female += 1,
                Some(Gender::Male) => tally.male += 1,
                None => {}
            }
        }
        tally
    }

    /// Rejects only a group with some, but fewer, female than male members.
    pub fn is_balanced(&self) -> bool {
        balanced(self.female, self.male)
    }
}

fn balanced(female: usize, male: usize) -> bool {
    !(0 < female && female < male)
}

/// Groups may be all male, or have at least as many female as male members.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenderBalance;

impl CompositionValidator for GenderBalance {
    fn name(&self) -> &'static str {
        "gender-balance"
    }

    fn is_valid(&self, members: &[&Student]) -> bool {
        GenderTally::of(members).is_balanced()
    }

    /// Exact check: walks the planned groups keeping every reachable
    /// (female placed, male placed) pair, where each group takes a balanced
    /// split and fills the rest with students without a recorded gender.
    fn is_satisfiable(&self, plan: &GroupPlan, pool: &[&Student]) -> bool {
        if plan.total_students() != pool.len() {
            return false;
        }
        let GenderTally { female, male } = GenderTally::of(pool);
        let width = male + 1;
        let mut reachable = vec![false; (female + 1) * width];
        reachable[0] = true;

        for size in plan.group_sizes() {
            let mut next = vec![false; reachable.len()];
            for f in 0..=female {
                for m in 0..=male {
                    if !reachable[f * width + m] {
                        continue;
                    }
                    for take_f in 0..=size.min(female - f) {
                        for take_m in 0..=(size - take_f).min(male - m) {
                            if balanced(take_f, take_m) {
                                next[(f + take_f) * width + m + take_m] = true;
                            }
                        }
                    }
                }
            }
            reachable = next;
        }

        reachable[female * width + male]
    }
}
