//! Integration tests for the home service booking app.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p homeservice-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `accounts` - registration, sign-in and profile flows through `AppState`
//! - `bookings` - booking lifecycle, ownership and notifications
//! - `persistence` - load/save against `MemoryStore`, `FileStore` and a
//!   store that always fails, plus a slow store for overlapping loads
//!
//! This library holds the shared fixtures.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use homeservice_app::storage::Result as StorageResult;
use homeservice_app::{AppState, FixedClock, KeyValueStore, MemoryStore, StorageError};

/// Fixed "now" used by every fixture: 2026-03-14 09:30 UTC.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// App state over a fresh in-memory store with a pinned clock.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

impl TestContext {
    /// Empty store, state already loaded.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Reuse `store`, e.g. to simulate a restart. State is loaded.
    pub async fn with_store(store: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(FixedClock::new(test_now()));
        let state = AppState::with_clock(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::clone(&clock) as Arc<dyn homeservice_app::Clock>,
        );
        state.load().await;
        Self {
            state,
            store,
            clock,
        }
    }

    /// Drop this state and start a new one over the same store.
    pub async fn restart(self) -> Self {
        self.state.flush().await;
        Self::with_store(self.store).await
    }
}

/// A store whose every operation fails, recording the keys it was asked for.
#[derive(Debug, Default)]
pub struct FailingStore {
    touched: Mutex<HashSet<String>>,
}

impl FailingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys any operation was attempted on.
    #[must_use]
    pub fn touched(&self) -> HashSet<String> {
        self.touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fail(&self, key: &str) -> StorageError {
        self.touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned());
        StorageError::Unavailable(format!("refusing access to {key}"))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Err(self.fail(key))
    }

    async fn set(&self, key: &str, _value: String) -> StorageResult<()> {
        Err(self.fail(key))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        Err(self.fail(key))
    }
}

/// An in-memory store that sleeps before every read and counts them.
#[derive(Debug, Default)]
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
    gets: AtomicUsize,
}

impl SlowStore {
    #[must_use]
    pub fn new(inner: MemoryStore, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            gets: AtomicUsize::new(0),
        }
    }

    /// Number of `get` calls made so far.
    #[must_use]
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }
}
