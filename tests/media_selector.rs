//! Media Selector Integration Tests
//!
//! Tests for extension/tag filtering, the selection cap, wraparound and
//! stale references.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use r3::domain::NO_DATA_MESSAGE;
use r3::store::LogicStore;
use r3::{
    CatalogOrdering, ContentPayload, Dispatcher, Logic, LogicError, MediaOrder, MediaRecord,
    MemoryStore, SelectionSettings, Trial,
};

fn settings(max_media_count: usize) -> SelectionSettings {
    SelectionSettings {
        max_media_count,
        ..SelectionSettings::default()
    }
}

#[tokio::test]
async fn test_filters_by_extension_and_tag() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    let store = dispatcher.store();
    store.add_media("jpg", "a b", "1.jpg", Vec::new()).await;
    store.add_media("txt", "a", "2.txt", Vec::new()).await;
    store.add_media("png", "c", "3.png", Vec::new()).await;

    let mut logic = Logic::new(1, "media").with_ext("*").with_tag("a");
    dispatcher.prepare(&mut logic).await.unwrap();

    assert_eq!(logic.media_list, "1");
    assert_eq!(logic.media_count, 1);
}

#[tokio::test]
async fn test_extension_filter_and_normalisation() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    let store = dispatcher.store();
    store.add_media("jpg", "x", "1.jpg", Vec::new()).await;
    store.add_media("png", "x", "2.png", Vec::new()).await;
    store.add_media("gif", "x", "3.gif", Vec::new()).await;

    let mut logic = Logic::new(1, "media")
        .with_ext("  jpg \t gif ")
        .with_tag(" * ");
    dispatcher.prepare(&mut logic).await.unwrap();

    assert_eq!(logic.media_ext, "jpg gif");
    assert_eq!(logic.media_tag, "*");
    // Newest first: descending id
    assert_eq!(logic.media_list, "3 1");

    let stored = dispatcher.store().get_logic(1).await.unwrap().unwrap();
    assert_eq!(stored.media_ext, "jpg gif");
}

#[tokio::test]
async fn test_selection_capped_at_max_media_count() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(5));
    for i in 0..12 {
        dispatcher
            .store()
            .add_media("jpg", "a", &format!("{}.jpg", i), Vec::new())
            .await;
    }

    let mut logic = Logic::new(1, "media");
    dispatcher.prepare(&mut logic).await.unwrap();

    assert_eq!(logic.media_count, 5);
    assert_eq!(logic.selection().len(), 5);
    // The newest five are kept
    assert_eq!(logic.media_list, "12 11 10 9 8");
}

#[tokio::test]
async fn test_wraparound() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    for i in 0..3 {
        dispatcher
            .store()
            .add_media("png", "a", &format!("{}.png", i), Vec::new())
            .await;
    }

    let mut logic = Logic::new(1, "media");
    dispatcher.prepare(&mut logic).await.unwrap();
    let trial = Trial::new(1);
    let count = logic.media_count as i64;
    assert_eq!(count, 3);

    for k in 0..7 {
        let base = dispatcher.fetch_content(&trial, k).await.unwrap();
        let wrapped = dispatcher.fetch_content(&trial, count + k).await.unwrap();
        assert_eq!(base, wrapped);
    }

    let first = dispatcher.fetch_content(&trial, 0).await.unwrap();
    assert_eq!(first, ContentPayload::media("png", "/media/2.png"));
}

#[tokio::test]
async fn test_negative_seq_counts_from_the_end() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    for i in 0..3 {
        dispatcher
            .store()
            .add_media("png", "a", &format!("{}.png", i), Vec::new())
            .await;
    }

    let mut logic = Logic::new(1, "media");
    dispatcher.prepare(&mut logic).await.unwrap();
    let trial = Trial::new(1);

    let last = dispatcher.fetch_content(&trial, 2).await.unwrap();
    assert_eq!(dispatcher.fetch_content(&trial, -1).await.unwrap(), last);
    assert_eq!(
        dispatcher.fetch_content(&trial, -3).await.unwrap(),
        dispatcher.fetch_content(&trial, 0).await.unwrap()
    );
}

#[tokio::test]
async fn test_empty_selection_returns_no_data() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    dispatcher.store().add_media("jpg", "b", "1.jpg", Vec::new()).await;

    let mut logic = Logic::new(1, "media").with_tag("a");
    dispatcher.prepare(&mut logic).await.unwrap();
    assert_eq!(logic.media_list, "");
    assert_eq!(logic.media_count, 0);

    let payload = dispatcher.fetch_content(&Trial::new(1), 3).await.unwrap();
    assert_eq!(payload.kind, "txt");
    assert_eq!(payload.data, NO_DATA_MESSAGE);
}

#[tokio::test]
async fn test_stale_media_is_not_found() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    let record = dispatcher.store().add_media("jpg", "a", "1.jpg", Vec::new()).await;

    let mut logic = Logic::new(1, "media");
    dispatcher.prepare(&mut logic).await.unwrap();
    dispatcher.store().remove_media(record.id).await;

    let err = dispatcher.fetch_content(&Trial::new(1), 0).await.unwrap_err();
    assert!(matches!(err, LogicError::MediaNotFound(id) if id == record.id));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_prepare_is_idempotent() {
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings(100));
    for i in 0..6 {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        dispatcher
            .store()
            .add_media("jpg", tag, &format!("{}.jpg", i), Vec::new())
            .await;
    }

    let mut sequential = Logic::new(1, "media").with_tag("even");
    dispatcher.prepare(&mut sequential).await.unwrap();
    let first = sequential.media_list.clone();
    dispatcher.prepare(&mut sequential).await.unwrap();
    assert_eq!(sequential.media_list, first);
    assert_eq!(sequential.media_count, 3);

    let mut shuffled = Logic::new(2, "media")
        .with_tag("even")
        .with_order(MediaOrder::Shuffle);
    dispatcher.prepare(&mut shuffled).await.unwrap();
    let first: HashSet<String> = shuffled.selection().iter().map(|s| s.to_string()).collect();
    dispatcher.prepare(&mut shuffled).await.unwrap();
    let second: HashSet<String> = shuffled.selection().iter().map(|s| s.to_string()).collect();

    assert_eq!(shuffled.media_count, 3);
    assert_eq!(first, second);
    assert_eq!(first, ["1", "3", "5"].iter().map(|s| s.to_string()).collect());
}

#[tokio::test]
async fn test_updated_descending_ordering() {
    let settings = SelectionSettings {
        catalog_ordering: CatalogOrdering::UpdatedDescending,
        ..SelectionSettings::default()
    };
    let dispatcher = Dispatcher::new(MemoryStore::new(), settings);
    let now = Utc::now();

    for (id, age_hours) in [(1, 0), (2, 5), (3, 2)] {
        let mut record = MediaRecord::new(id, "jpg", "a", format!("{}.jpg", id), format!("/m/{}", id));
        record.updated_at = now - Duration::hours(age_hours);
        dispatcher.store().insert_media(record, Vec::new()).await;
    }

    let mut logic = Logic::new(1, "media");
    dispatcher.prepare(&mut logic).await.unwrap();
    assert_eq!(logic.media_list, "1 3 2");
}
