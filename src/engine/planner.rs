use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GroupingError, Result};

/// How many groups of each size a session needs.
///
/// Invariant: `sum(size * count) == total` for the total it was planned for,
/// and every stored count is positive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPlan {
    counts: BTreeMap<usize, usize>,
}

impl GroupPlan {
    /// Build a plan from explicit `(size, count)` entries. Zero sizes and
    /// zero counts are dropped.
    pub fn from_counts(entries: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut counts = BTreeMap::new();
        for (size, count) in entries {
            if size > 0 && count > 0 {
                *counts.entry(size).or_insert(0) += count;
            }
        }
        Self { counts }
    }

    /// `(size, count)` entries, largest groups first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().rev().map(|(&size, &count)| (size, count))
    }

    /// One entry per group, largest first.
    pub fn group_sizes(&self) -> Vec<usize> {
        self.iter()
            .flat_map(|(size, count)| std::iter::repeat_n(size, count))
            .collect()
    }

    pub fn count_of(&self, size: usize) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    pub fn total_students(&self) -> usize {
        self.counts.iter().map(|(size, count)| size * count).sum()
    }

    pub fn group_count(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl fmt::Display for GroupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no groups");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(size, count)| {
                let noun = if count == 1 { "group" } else { "groups" };
                format!("{count} {noun} of {size}")
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Split `total` students into groups of `target` members.
///
/// Full groups of `target` are taken first and the remainder is planned with
/// the next smaller size. A remainder of exactly one never becomes a singleton:
/// one of the groups from the previous step is dissolved and its members are
/// planned again together with the leftover student. With a target of two that
/// produces a single group of three.
pub fn plan(total: usize, target: usize) -> Result<GroupPlan> {
    if target == 0 {
        return Err(GroupingError::InvalidConfiguration(
            "group size must be at least 1".to_string(),
        ));
    }
    // A lone student can only ever form a group by themselves.
    if total <= 1 {
        return Ok(GroupPlan::from_counts([(total, total)]));
    }

    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    let mut remaining = total;
    let mut size = target;

    while remaining > 0 {
        if remaining == 1 {
            let previous = size + 1;
            let dissolved = match counts.get_mut(&previous) {
                Some(count) if *count > 0 => count,
                _ => {
                    return Err(GroupingError::InvalidConfiguration(format!(
                        "cannot place a single leftover student ({total} students, group size {target})"
                    )));
                }
            };
            *dissolved -= 1;
            remaining += previous;
            if size == 1 {
                *counts.entry(remaining).or_insert(0) += 1;
                remaining = 0;
            }
            continue;
        }

        if remaining <= size {
            *counts.entry(remaining).or_insert(0) += 1;
            break;
        }

        *counts.entry(size).or_insert(0) += remaining / size;
        remaining %= size;
        size -= 1;
    }

    let plan = GroupPlan::from_counts(counts);
    debug_assert_eq!(plan.total_students(), total);
    tracing::debug!(total, target, plan = %plan, "planned group sizes");
    Ok(plan)
}
