use std::collections::{BTreeMap, HashMap};

use crate::error::{GroupingError, Result};
use crate::roster::StudentId;

/// Persisted shape of the ledger: student -> partner -> times grouped together.
pub type HistorySnapshot = BTreeMap<StudentId, BTreeMap<StudentId, u32>>;

/// Symmetric ledger of how often each pair of students has shared a group.
///
/// Counts are written in both directions on every update, so
/// `count(a, b) == count(b, a)` always holds. A registered pair with no
/// recorded entry counts as zero. Rows for students that are no longer
/// registered are carried along so they survive a save.
#[derive(Clone, Debug, Default)]
pub struct PairHistory {
    order: Vec<StudentId>,
    index: HashMap<StudentId, usize>,
    rows: HashMap<StudentId, HashMap<StudentId, u32>>,
}

impl PairHistory {
    /// Fresh ledger with every pair of `ids` at zero.
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut history = Self::default();
        for id in ids {
            history.register(id);
        }
        history
    }

    /// Rebuild a ledger from persisted rows, registering `ids` in order.
    /// Conflicting directions are reconciled by keeping the larger count.
    pub fn from_snapshot<'a>(
        snapshot: &HistorySnapshot,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut history = Self::new(ids);
        for (student, partners) in snapshot {
            for (partner, &count) in partners {
                if student == partner {
                    tracing::warn!(student = %student, "ignoring self-pairing entry in history");
                    continue;
                }
                let current = history.get(student, partner);
                let reverse_seen = history
                    .rows
                    .get(partner.as_str())
                    .is_some_and(|row| row.contains_key(student.as_str()));
                if reverse_seen && current != count {
                    tracing::warn!(
                        student = %student,
                        partner = %partner,
                        forward = count,
                        reverse = current,
                        "asymmetric history entry, keeping the larger count"
                    );
                }
                history.set(student, partner, current.max(count));
            }
        }
        history
    }

    /// Ledger for a stored snapshot alone, registering every id it mentions.
    pub fn from_snapshot_only(snapshot: &HistorySnapshot) -> Self {
        let mut ids: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        for partners in snapshot.values() {
            ids.extend(partners.keys().map(String::as_str));
        }
        ids.sort_unstable();
        ids.dedup();
        Self::from_snapshot(snapshot, ids)
    }

    /// Returns false if the student was already registered.
    pub fn register(&mut self, id: &str) -> bool {
        if self.index.contains_key(id) {
            return false;
        }
        self.index.insert(id.to_string(), self.order.len());
        self.order.push(id.to_string());
        self.rows.entry(id.to_string()).or_default();
        true
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn students(&self) -> &[StudentId] {
        &self.order
    }

    pub fn count(&self, a: &str, b: &str) -> Result<u32> {
        self.ensure_registered(a)?;
        self.ensure_registered(b)?;
        Ok(self.get(a, b))
    }

    /// Bump every unordered pair of distinct members by one, in both directions.
    /// Nothing is written unless every member is registered.
    pub fn increment_all_pairs<'a>(
        &mut self,
        members: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        let members: Vec<&str> = members.into_iter().collect();
        for id in &members {
            self.ensure_registered(id)?;
        }
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if a == b {
                    continue;
                }
                let next = self.get(a, b) + 1;
                self.set(a, b, next);
            }
        }
        Ok(())
    }

    /// Every other registered student with their count for `id`, least paired
    /// first. Ties keep registration order. A lookup for callers and reports;
    /// the composer keeps its own running scores from [`PairHistory::count`].
    pub fn partners_by_frequency(&self, id: &str) -> Result<Vec<(StudentId, u32)>> {
        self.ensure_registered(id)?;
        let mut partners: Vec<(StudentId, u32)> = self
            .order
            .iter()
            .filter(|other| other.as_str() != id)
            .map(|other| (other.clone(), self.get(id, other)))
            .collect();
        partners.sort_by_key(|(_, count)| *count);
        Ok(partners)
    }

    /// Number of unordered pairs at each pairing count. Registered pairs with
    /// no entry land in the zero bucket.
    pub fn histogram(&self) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for (_, _, count) in self.unordered_pairs() {
            *histogram.entry(count).or_insert(0) += 1;
        }
        histogram
    }

    /// Unordered pairs grouped together at least `min_count` times, most
    /// frequent first.
    pub fn repeat_pairings(&self, min_count: u32) -> Vec<(StudentId, StudentId, u32)> {
        let mut pairs: Vec<(StudentId, StudentId, u32)> = self
            .unordered_pairs()
            .into_iter()
            .filter(|(_, _, count)| *count >= min_count)
            .map(|(a, b, count)| (a.to_string(), b.to_string(), count))
            .collect();
        pairs.sort_by(|x, y| y.2.cmp(&x.2).then_with(|| (&x.0, &x.1).cmp(&(&y.0, &y.1))));
        pairs
    }

    /// Full two-directional mapping, zero entries included for registered pairs.
    pub fn snapshot(&self) -> HistorySnapshot {
        let mut snapshot = HistorySnapshot::new();
        for id in &self.order {
            snapshot.entry(id.clone()).or_default();
        }
        for (a, b, count) in self.unordered_pairs() {
            snapshot
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string(), count);
            snapshot
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string(), count);
        }
        snapshot
    }

    /// Each unordered pair exactly once: all registered pairs, then stored
    /// pairs that involve a student no longer registered.
    fn unordered_pairs(&self) -> Vec<(&str, &str, u32)> {
        let mut pairs = Vec::new();
        for (i, a) in self.order.iter().enumerate() {
            for b in &self.order[i + 1..] {
                pairs.push((a.as_str(), b.as_str(), self.get(a, b)));
            }
        }
        let mut departed: Vec<(&str, &str, u32)> = self
            .rows
            .iter()
            .flat_map(|(a, row)| {
                row.iter()
                    .map(move |(b, &count)| (a.as_str(), b.as_str(), count))
            })
            .filter(|(a, b, _)| a < b && !(self.is_registered(a) && self.is_registered(b)))
            .collect();
        departed.sort_unstable();
        pairs.extend(departed);
        pairs
    }

    fn ensure_registered(&self, id: &str) -> Result<()> {
        if self.is_registered(id) {
            Ok(())
        } else {
            Err(GroupingError::UnknownStudent(id.to_string()))
        }
    }

    fn get(&self, a: &str, b: &str) -> u32 {
        self.rows
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    fn set(&mut self, a: &str, b: &str, count: u32) {
        self.rows
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), count);
        self.rows
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), count);
    }
}
