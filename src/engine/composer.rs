use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::composition::CompositionValidator;
use crate::engine::group::{Group, Session};
use crate::engine::pair_history::PairHistory;
use crate::engine::planner::GroupPlan;
use crate::error::{GroupingError, Result};
use crate::roster::Student;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Greedy group builder. Each group starts from a random student and grows by
/// adding whoever has been paired least with the members chosen so far. If any
/// finished group breaks the composition rule the whole session is thrown away
/// and rebuilt from a fresh shuffle.
pub struct GroupComposer<'v> {
    validator: &'v dyn CompositionValidator,
    max_attempts: usize,
}

impl<'v> GroupComposer<'v> {
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

    pub fn compose<'a, R: Rng + ?Sized>(
        &self,
        pool: &[&'a Student],
        plan: &GroupPlan,
        history: &PairHistory,
        rng: &mut R,
    ) -> Result<Session<'a>> {
        if self.max_attempts == 0 {
            return Err(GroupingError::InvalidConfiguration(
                "max attempts must be at least 1".to_string(),
            ));
        }
        if plan.total_students() != pool.len() {
            return Err(GroupingError::InvalidConfiguration(format!(
                "plan places {} students but the pool holds {}",
                plan.total_students(),
                pool.len()
            )));
        }
        if let Some(stranger) = pool.iter().find(|s| !history.is_registered(&s.id)) {
            return Err(GroupingError::UnknownStudent(stranger.id.clone()));
        }
        if !self.validator.is_satisfiable(plan, pool) {
            return Err(GroupingError::UnsatisfiableComposition {
                attempts: 0,
                reason: format!(
                    "no way to split this roster into {plan} under the {} rule",
                    self.validator.name()
                ),
            });
        }

        for attempt in 1..=self.max_attempts {
            if let Some(groups) = self.attempt(pool, plan, history, rng)? {
                tracing::info!(attempt, groups = groups.len(), "formed groups");
                return Ok(Session::new(groups, attempt));
            }
            tracing::debug!(attempt, "failed composition check, reshuffling");
        }

        Err(GroupingError::UnsatisfiableComposition {
            attempts: self.max_attempts,
            reason: format!(
                "every attempt produced a group that breaks the {} rule",
                self.validator.name()
            ),
        })
    }

    /// One whole-session attempt. `None` when a finished group fails validation.
    fn attempt<'a, R: Rng + ?Sized>(
        &self,
        pool: &[&'a Student],
        plan: &GroupPlan,
        history: &PairHistory,
        rng: &mut R,
    ) -> Result<Option<Vec<Group<'a>>>> {
        let mut remaining: Vec<&'a Student> = pool.to_vec();
        remaining.shuffle(rng);

        let mut groups = Vec::with_capacity(plan.group_count());
        for (size, count) in plan.iter() {
            for _ in 0..count {
                tracing::debug!(group = groups.len(), size, "creating group");
                let group = assemble(size, &mut remaining, history, rng)?;
                if !self.validator.is_valid(group.members()) {
                    return Ok(None);
                }
                groups.push(group);
            }
        }
        Ok(Some(groups))
    }
}

/// Pull `size` students out of `remaining`. `scores[i]` is the summed pairing
/// count between `remaining[i]` and everyone already in the group.
fn assemble<'a, R: Rng + ?Sized>(
    size: usize,
    remaining: &mut Vec<&'a Student>,
    history: &PairHistory,
    rng: &mut R,
) -> Result<Group<'a>> {
    let Some(seed) = remaining.pop() else {
        return Err(GroupingError::InvalidConfiguration(
            "ran out of students before the plan was filled".to_string(),
        ));
    };
    let mut scores = remaining
        .iter()
        .map(|candidate| history.count(&seed.id, &candidate.id))
        .collect::<Result<Vec<u32>>>()?;
    let mut members = vec![seed];

    while members.len() < size {
        let Some(&least) = scores.iter().min() else {
            return Err(GroupingError::InvalidConfiguration(
                "ran out of students before the plan was filled".to_string(),
            ));
        };
        let ties: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score == least)
            .map(|(i, _)| i)
            .collect();
        let pick = ties[rng.gen_range(0..ties.len())];

        let chosen = remaining.swap_remove(pick);
        scores.swap_remove(pick);
        for (candidate, score) in remaining.iter().zip(scores.iter_mut()) {
            *score += history.count(&chosen.id, &candidate.id)?;
        }
        tracing::debug!(student = %chosen, pairings = least, "chose partner");
        members.push(chosen);
    }

    Ok(Group::new(members))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::composition::{AnyComposition, GenderBalance};
    use crate::engine::planner::plan;

    fn class(genders: &[&str]) -> Vec<Student> {
        genders
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Student::new(format!("s{i}"), "First", format!("Last{i}"), Some(*g)).unwrap()
            })
            .collect()
    }

    fn history_for(students: &[Student]) -> PairHistory {
        PairHistory::new(students.iter().map(|s| s.id.as_str()))
    }

    #[test]
    fn test_session_covers_pool_exactly_once() {
        let students = class(&["m", "f", "m", "f", "m", "f", "f", "m", "f", "f"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = history_for(&students);
        let p = plan(pool.len(), 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        let session = GroupComposer::new(&GenderBalance)
            .compose(&pool, &p, &history, &mut rng)
            .unwrap();

        assert_eq!(session.student_count(), students.len());
        let ids: HashSet<&str> = session.students().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), students.len());
        let sizes: Vec<usize> = session.groups().iter().map(Group::len).collect();
        assert_eq!(sizes, p.group_sizes());
        for group in session.groups() {
            assert!(GenderBalance.is_valid(group.members()));
        }
    }

    #[test]
    fn test_same_seed_same_groups() {
        let students = class(&["m", "f", "m", "f", "m", "f", "m", "f", "m"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = history_for(&students);
        let p = plan(pool.len(), 3).unwrap();
        let composer = GroupComposer::new(&AnyComposition);

        let first = composer
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(7))
            .unwrap();
        let second = composer
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(first.groups(), second.groups());
    }

    #[test]
    fn test_prefers_least_paired_partners() {
        // a and b have worked together many times; c and d never with anyone.
        let students = class(&["m", "m", "m", "m"]);
        let pool: Vec<&Student> = students.iter().collect();
        let mut history = history_for(&students);
        for _ in 0..5 {
            history.increment_all_pairs(["s0", "s1"]).unwrap();
            history.increment_all_pairs(["s2", "s3"]).unwrap();
        }
        let p = plan(4, 2).unwrap();
        let composer = GroupComposer::new(&AnyComposition);

        for seed in 0..20 {
            let session = composer
                .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(seed))
                .unwrap();
            for group in session.groups() {
                let ids: HashSet<&str> = group.ids().collect();
                assert_ne!(ids, HashSet::from(["s0", "s1"]), "seed {seed}");
                assert_ne!(ids, HashSet::from(["s2", "s3"]), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_later_picks_count_every_member_already_chosen() {
        // s3 seeds the group (last in `remaining`). s0 is the only student
        // s3 has never met, so it is picked first. s1 and s2 then tie on s3's
        // counts and only s0's history with s1 separates them.
        let students = class(&["m", "m", "m", "m"]);
        let mut history = history_for(&students);
        history.increment_all_pairs(["s3", "s1"]).unwrap();
        history.increment_all_pairs(["s3", "s2"]).unwrap();
        for _ in 0..5 {
            history.increment_all_pairs(["s0", "s1"]).unwrap();
        }

        for seed in 0..50 {
            let mut remaining: Vec<&Student> = students.iter().collect();
            let mut rng = SmallRng::seed_from_u64(seed);
            let group = assemble(3, &mut remaining, &history, &mut rng).unwrap();
            let ids: Vec<&str> = group.ids().collect();
            assert_eq!(ids, vec!["s3", "s0", "s2"], "seed {seed}");
            let left: Vec<&str> = remaining.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(left, vec!["s1"], "seed {seed}");
        }
    }

    #[test]
    fn test_unsatisfiable_roster_fails_without_sampling() {
        let students = class(&["m", "m", "m", "m", "m", "f"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = history_for(&students);
        let p = plan(6, 3).unwrap();
        let err = GroupComposer::new(&GenderBalance)
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GroupingError::UnsatisfiableComposition { attempts: 0, .. }
        ));
    }

    struct Never;

    impl CompositionValidator for Never {
        fn name(&self) -> &'static str {
            "never"
        }

        fn is_valid(&self, _members: &[&Student]) -> bool {
            false
        }
    }

    #[test]
    fn test_attempts_are_capped() {
        let students = class(&["m", "f", "m", "f"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = history_for(&students);
        let p = plan(4, 2).unwrap();
        let err = GroupComposer::new(&Never)
            .with_max_attempts(25)
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GroupingError::UnsatisfiableComposition { attempts: 25, .. }
        ));
    }

    #[test]
    fn test_unregistered_student_is_rejected() {
        let students = class(&["m", "f"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = PairHistory::new(["s0"]);
        let p = plan(2, 2).unwrap();
        let err = GroupComposer::new(&AnyComposition)
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err, GroupingError::UnknownStudent("s1".to_string()));
    }

    #[test]
    fn test_plan_must_match_pool() {
        let students = class(&["m", "f", "m"]);
        let pool: Vec<&Student> = students.iter().collect();
        let history = history_for(&students);
        let p = plan(4, 2).unwrap();
        let err = GroupComposer::new(&AnyComposition)
            .compose(&pool, &p, &history, &mut SmallRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, GroupingError::InvalidConfiguration(_)));
    }
}
