//! In-memory document store.
//!
//! Collections hold whole documents keyed by id; repositories clone on read
//! and replace whole documents on write. The keyed mutex serializes writers
//! that must not interleave: time-event processing per
//! `(race_id, timing_point)` and generation commands per event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::models::{Race, RaceResult, Raceplan, StartEntry, Startlist, TimeEvent};

#[derive(Default)]
pub struct Database {
    pub(crate) raceplans: RwLock<HashMap<Uuid, Raceplan>>,
    pub(crate) races: RwLock<HashMap<Uuid, Race>>,
    pub(crate) startlists: RwLock<HashMap<Uuid, Startlist>>,
    pub(crate) start_entries: RwLock<HashMap<Uuid, StartEntry>>,
    pub(crate) race_results: RwLock<HashMap<Uuid, RaceResult>>,
    pub(crate) time_events: RwLock<HashMap<Uuid, TimeEvent>>,
    locks: KeyedMutex,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the logical mutex for `key`, e.g. an event id or a
    /// `"{race_id}/{timing_point}"` pair. Held only for the duration of a
    /// mutation, never across a response.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(key).await
    }
}

/// A map of lazily created, never reclaimed mutexes by string key. The key
/// space is bounded by the number of races and events in the store.
#[derive(Default)]
struct KeyedMutex {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedMutex {
    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().expect("keyed mutex poisoned");
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyed_mutex_serializes_same_key() {
        let db = Database::new();
        let guard = db.lock("race-1/Finish").await;
        // A different key must not block.
        let other = db.lock("race-2/Finish").await;
        drop(other);
        drop(guard);
        // Same key is acquirable again after release.
        let _again = db.lock("race-1/Finish").await;
    }
}
