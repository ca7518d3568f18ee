//! State Log Integration Tests
//!
//! Tests for entry format, ordering and persistence of the per-Logic log.

use r3::core::parse_entry;
use r3::store::LogicStore;
use r3::{Logic, MemoryStore, StateLog, StateRetention};

#[tokio::test]
async fn test_entries_are_ordered_and_timestamped() {
    let store = MemoryStore::new();
    let log = StateLog::default();
    let mut logic = Logic::new(1, "media");

    const N: usize = 25;
    for i in 0..N {
        log.append(&store, &mut logic, &format!("step {}", i))
            .await
            .unwrap();
    }

    assert_eq!(logic.state.matches('\n').count(), N);
    assert!(logic.state.ends_with('\n'));

    let entries: Vec<_> = logic
        .state
        .lines()
        .map(|line| parse_entry(line).expect("parseable entry"))
        .collect();
    assert_eq!(entries.len(), N);

    for (i, (_, message)) in entries.iter().enumerate() {
        assert_eq!(*message, format!("step {}", i));
    }
    for pair in entries.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
    }
}

#[tokio::test]
async fn test_every_append_is_persisted() {
    let store = MemoryStore::new();
    let log = StateLog::default();
    let mut logic = Logic::new(3, "blank");

    log.append(&store, &mut logic, "first").await.unwrap();
    let stored = store.get_logic(3).await.unwrap().unwrap();
    assert_eq!(stored.state.lines().count(), 1);

    log.append(&store, &mut logic, "second").await.unwrap();
    let stored = store.get_logic(3).await.unwrap().unwrap();
    assert_eq!(stored.state, logic.state);
    assert_eq!(stored.state.lines().count(), 2);
}

#[tokio::test]
async fn test_retention_limits_persisted_log() {
    let store = MemoryStore::new();
    let log = StateLog::new(StateRetention::KeepLast(3));
    let mut logic = Logic::new(1, "blank");

    for i in 0..10 {
        log.append(&store, &mut logic, &format!("m{}", i)).await.unwrap();
    }

    let stored = store.get_logic(1).await.unwrap().unwrap();
    let messages: Vec<_> = stored
        .state
        .lines()
        .filter_map(parse_entry)
        .map(|(_, m)| m.to_string())
        .collect();
    assert_eq!(messages, vec!["m7", "m8", "m9"]);
}
