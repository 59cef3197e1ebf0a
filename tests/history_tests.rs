//! Integration tests for the download history store.
//!
//! Tests cover:
//! - Persistence across reopen
//! - Replace without duplicates
//! - Forced flag bookkeeping
//! - Insertion order

mod common;

use common::source;
use tempfile::TempDir;
use trailarr::core::history::HistoryStore;
use trailarr::core::selector;
use trailarr::models::media::MediaDetails;
use trailarr::models::trailer::TrailerRecord;

fn record(tmdb_id: u64, url: &str, hash: &str, bitrate: u64) -> TrailerRecord {
    TrailerRecord::new(
        source(tmdb_id, url),
        MediaDetails {
            broken: false,
            hash: hash.to_string(),
            height: Some(720),
            width: Some(1280),
            duration: Some(95.25),
            frames: Some(2286),
            bitrate: Some(bitrate),
            codec: Some("vp9".to_string()),
        },
    )
}

#[test]
fn test_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data").join("trailarr.db");

    {
        let store = HistoryStore::open(&db).unwrap();
        store.upsert(&record(1, "a", "ha", 100)).unwrap();
    }

    let store = HistoryStore::open(&db).unwrap();
    let records = store.by_tmdb_id(1).unwrap();
    assert_eq!(records, vec![record(1, "a", "ha", 100)]);
    assert!((records[0].details.duration.unwrap() - 95.25).abs() < 1e-9);
}

#[test]
fn test_replace_does_not_duplicate() {
    let store = HistoryStore::open_in_memory().unwrap();
    store.upsert(&record(1, "a", "old", 100)).unwrap();
    store.upsert(&record(1, "a", "new", 200)).unwrap();

    let records = store.by_tmdb_id(1).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].hash(), "new");
    assert_eq!(store.by_hash("old").unwrap(), None);
}

#[test]
fn test_same_url_for_two_movies() {
    let store = HistoryStore::open_in_memory().unwrap();
    store.upsert(&record(1, "shared", "h1", 100)).unwrap();
    store.upsert(&record(2, "shared", "h2", 100)).unwrap();

    assert_eq!(store.by_tmdb_id(1).unwrap().len(), 1);
    assert_eq!(store.by_tmdb_id(2).unwrap().len(), 1);
    assert_eq!(store.delete(1).unwrap(), 1);
    assert!(store.contains(2, "shared").unwrap());
}

#[test]
fn test_insertion_order() {
    let store = HistoryStore::open_in_memory().unwrap();
    for url in ["c", "a", "b"] {
        store.upsert(&record(1, url, url, 100)).unwrap();
    }
    let urls: Vec<String> = store
        .by_tmdb_id(1)
        .unwrap()
        .into_iter()
        .map(|r| r.url().to_string())
        .collect();
    assert_eq!(urls, vec!["c", "a", "b"]);

    // Equal scores: the first stored wins
    assert_eq!(selector::best_trailer(&store, 1).unwrap().unwrap().url(), "c");
}

#[test]
fn test_set_forced_and_clear() {
    let store = HistoryStore::open_in_memory().unwrap();
    store.upsert(&record(1, "low", "h1", 100)).unwrap();
    store.upsert(&record(1, "high", "h2", 900)).unwrap();
    assert_eq!(selector::best_trailer(&store, 1).unwrap().unwrap().url(), "high");

    assert!(store.set_forced(1, "low").unwrap());
    assert_eq!(selector::best_trailer(&store, 1).unwrap().unwrap().url(), "low");

    assert!(store.set_forced(1, "high").unwrap());
    let forced: Vec<_> = store
        .by_tmdb_id(1)
        .unwrap()
        .into_iter()
        .filter(|r| r.forced)
        .map(|r| r.url().to_string())
        .collect();
    assert_eq!(forced, vec!["high"]);

    // Unknown URL leaves the flags alone
    assert!(!store.set_forced(1, "missing").unwrap());
    assert!(store.by_url("high").unwrap().unwrap().forced);

    store.clear_forced(1).unwrap();
    assert!(store.by_tmdb_id(1).unwrap().iter().all(|r| !r.forced));
}

#[test]
fn test_delete() {
    let store = HistoryStore::open_in_memory().unwrap();
    store.upsert(&record(1, "a", "ha", 100)).unwrap();
    store.upsert(&record(1, "b", "hb", 100)).unwrap();
    store.upsert(&record(2, "c", "hc", 100)).unwrap();

    assert_eq!(store.delete(1).unwrap(), 2);
    assert!(store.by_tmdb_id(1).unwrap().is_empty());
    assert_eq!(store.by_tmdb_id(2).unwrap().len(), 1);
    assert_eq!(selector::best_trailer(&store, 1).unwrap(), None);
}
