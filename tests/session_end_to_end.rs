use std::collections::HashSet;
use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use groupwise::engine::{GenderBalance, PairHistory, SessionOrchestrator};
use groupwise::roster::Roster;
use groupwise::store::json_store::HistoryStore;

const SIX_STUDENTS: &str = "\
1, John, Smith, m
2, Jim, Doe, m
3, Jane, Mills, f
4, Jill, Cook, f
5, Sam, Hart, M
6, Ada, Byron, F
";

fn load_history(store: &HistoryStore, roster: &Roster) -> PairHistory {
    match store.load_pairs().unwrap() {
        Some(pairs) => PairHistory::from_snapshot(&pairs, roster.ids()),
        None => PairHistory::new(roster.ids()),
    }
}

#[test]
fn test_six_students_two_balanced_triples() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"));
    let roster = Roster::parse(SIX_STUDENTS).unwrap();
    let mut history = load_history(&store, &roster);
    let mut rng = SmallRng::seed_from_u64(42);

    let (session, report) = SessionOrchestrator::new(&GenderBalance)
        .run(roster.students(), 3, &mut history, &mut rng)
        .unwrap();
    store.save(&history.snapshot()).unwrap();

    assert_eq!(session.groups().len(), 2);
    assert_eq!(report.plan.group_sizes(), vec![3, 3]);

    let saved = store.load_pairs().unwrap().unwrap();
    let reloaded = PairHistory::from_snapshot(&saved, roster.ids());
    for group in session.groups() {
        assert_eq!(group.len(), 3);
        let ids: Vec<&str> = group.ids().collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_eq!(reloaded.count(a, b).unwrap(), 1);
                assert_eq!(reloaded.count(b, a).unwrap(), 1);
            }
        }
    }
    assert_eq!(reloaded.histogram().get(&1), Some(&6));
}

#[test]
fn test_repeated_sessions_spread_partners() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"));
    let roster_text: String = (0..12)
        .map(|i| {
            let gender = if i % 2 == 0 { "m" } else { "f" };
            format!("{i}, First{i}, Last{i}, {gender}\n")
        })
        .collect();
    let roster = Roster::parse(&roster_text).unwrap();
    let orchestrator = SessionOrchestrator::new(&GenderBalance);

    for round in 0..3u64 {
        let mut history = load_history(&store, &roster);
        let mut rng = SmallRng::seed_from_u64(100 + round);
        let (session, _) = orchestrator
            .run(roster.students(), 3, &mut history, &mut rng)
            .unwrap();

        let seen: HashSet<&str> = session.students().map(|s| s.id.as_str()).collect();
        assert_eq!(seen.len(), roster.len());
        assert_eq!(session.student_count(), roster.len());

        store.save(&history.snapshot()).unwrap();
    }

    // 3 sessions of 4 triples record 36 pairings over 66 possible pairs.
    let history = load_history(&store, &roster);
    let total: usize = history
        .histogram()
        .iter()
        .map(|(times, pairs)| *times as usize * pairs)
        .sum();
    assert_eq!(total, 36);
    assert_eq!(history.histogram().values().sum::<usize>(), 66);
}

#[test]
fn test_new_student_joins_existing_history() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"));
    let roster = Roster::parse(SIX_STUDENTS).unwrap();
    let mut history = load_history(&store, &roster);
    SessionOrchestrator::new(&GenderBalance)
        .run(roster.students(), 3, &mut history, &mut SmallRng::seed_from_u64(1))
        .unwrap();
    store.save(&history.snapshot()).unwrap();

    let bigger = Roster::parse(&format!("{SIX_STUDENTS}7, Kim, Lee, f\n")).unwrap();
    let mut history = load_history(&store, &bigger);
    assert_eq!(history.count("7", "1").unwrap(), 0);
    let (session, _) = SessionOrchestrator::new(&GenderBalance)
        .run(bigger.students(), 3, &mut history, &mut SmallRng::seed_from_u64(2))
        .unwrap();
    assert_eq!(session.student_count(), 7);
}

#[test]
fn test_legacy_history_file_is_upgraded_on_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");
    fs::write(&path, r#"{"1": {"2": 1, "3": 0}, "2": {"1": 1, "3": 0}, "3": {"1": 0, "2": 0}}"#)
        .unwrap();
    let store = HistoryStore::new(&path);
    let pairs = store.load_pairs().unwrap().unwrap();
    let history = PairHistory::from_snapshot(&pairs, ["1", "2", "3"]);
    store.save(&history.snapshot()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"schema_version\": 1"));
    assert_eq!(store.load_pairs().unwrap().unwrap(), pairs);
}
