use super::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};

#[test]
fn first_store_wins() {
    let cache: Canonical<&str, u32> = Canonical::new();
    assert!(cache.is_empty());
    assert_eq!(cache.load_or_store("*int", 1), (1, false));
    assert_eq!(cache.load_or_store("*int", 2), (1, true));
    assert_eq!(cache.load(&"*int"), Some(1));
    assert_eq!(cache.load(&"[]int"), None);
    assert_eq!(cache.len(), 1);
}

#[test]
fn builder_runs_only_for_missing_keys() {
    let cache: Canonical<u64, u32> = Canonical::new();
    let mut calls = 0;
    let a = cache.load_or_insert_with(7, || {
        calls += 1;
        10
    });
    let b = cache.load_or_insert_with(7, || {
        calls += 1;
        20
    });
    assert_eq!((a, b, calls), (10, 10, 1));
}

#[test]
fn failed_build_stores_nothing() {
    let cache: Canonical<u64, u32> = Canonical::new();
    let failed: Result<u32, &str> = cache.try_load_or_insert_with(1, || Err("too large"));
    assert_eq!(failed, Err("too large"));
    assert!(cache.is_empty());

    let stored: Result<u32, &str> = cache.try_load_or_insert_with(1, || Ok(5));
    assert_eq!(stored, Ok(5));
    let again: Result<u32, &str> = cache.try_load_or_insert_with(1, || Err("unused"));
    assert_eq!(again, Ok(5));
}

#[test]
fn concurrent_inserts_agree_on_one_value() {
    let cache: Canonical<u32, u32> = Canonical::new();
    let next = AtomicU32::new(100);
    let threads = 8;

    let results: Vec<Vec<u32>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| {
                    (0..64)
                        .map(|key| {
                            cache.load_or_insert_with(key, || next.fetch_add(1, Ordering::Relaxed))
                        })
                        .collect::<Vec<u32>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should not panic"))
            .collect()
    });

    for seen in &results[1..] {
        assert_eq!(seen, &results[0]);
    }
    assert_eq!(cache.len(), 64);
    // One build per key, no matter how many threads raced.
    assert_eq!(next.load(Ordering::Relaxed), 100 + 64);
}

#[test]
fn debug_shows_entry_count() {
    let cache: Canonical<u8, u8> = Canonical::default();
    cache.load_or_store(1, 1);
    assert_eq!(format!("{cache:?}"), "Canonical { entries: 1 }");
}
