//! In-memory fakes of the record store and the cache.
//!
//! Both fakes keep counters so tests can assert on store access, connection
//! lifetimes and cache traffic without a running database or Redis.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::cache::CacheClient;
use crate::error::{PersistenceError, Result};
use crate::store::{StoreConnection, StoreConnector};
use catalog_domain::{NewProduct, Product, ProductId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// FAKE RECORD STORE
// =============================================================================

/// Holds the next listing query open until released.
#[derive(Clone, Default)]
pub struct ListingGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl ListingGate {
    /// Wait until a listing query has taken its snapshot
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the held listing query return its snapshot
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct FakeState {
    rows: Mutex<Vec<Product>>,
    next_id: AtomicI64,
    failing_connects: AtomicU32,
    failing_queries: AtomicBool,
    connect_attempts: Mutex<Vec<Instant>>,
    opened: AtomicUsize,
    open_now: AtomicUsize,
    max_open: AtomicUsize,
    listing_queries: AtomicUsize,
    listing_gate: Mutex<Option<ListingGate>>,
}

/// Record store fake. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<FakeState>,
}

impl FakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate committed rows, assigning ids in order
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let store = Self::new();
        {
            let mut rows = lock(&store.state.rows);
            for product in products {
                let id = store.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                rows.push(product.with_id(id));
            }
        }
        store
    }

    /// Make the next `n` connection attempts fail
    pub fn fail_next_connects(&self, n: u32) {
        self.state.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Make every statement on open connections fail
    pub fn fail_queries(&self, failing: bool) {
        self.state.failing_queries.store(failing, Ordering::SeqCst);
    }

    /// Hold the next `fetch_products` call after it snapshots the rows
    #[must_use]
    pub fn gate_next_listing(&self) -> ListingGate {
        let gate = ListingGate::default();
        *lock(&self.state.listing_gate) = Some(gate.clone());
        gate
    }

    /// Committed rows
    #[must_use]
    pub fn rows(&self) -> Vec<Product> {
        lock(&self.state.rows).clone()
    }

    /// Instants of every connection attempt, successful or not
    #[must_use]
    pub fn connect_attempts(&self) -> Vec<Instant> {
        lock(&self.state.connect_attempts).clone()
    }

    /// Connections successfully opened so far
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Connections opened but not yet closed
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.state.open_now.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open connections observed
    #[must_use]
    pub fn max_open_connections(&self) -> usize {
        self.state.max_open.load(Ordering::SeqCst)
    }

    /// Full-listing queries executed
    #[must_use]
    pub fn listing_queries(&self) -> usize {
        self.state.listing_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for FakeStore {
    async fn open(&self) -> Result<Box<dyn StoreConnection>> {
        lock(&self.state.connect_attempts).push(Instant::now());

        let failing = self
            .state
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PersistenceError::Store("connection refused".to_string()));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let now_open = self.state.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_open.fetch_max(now_open, Ordering::SeqCst);

        Ok(Box::new(FakeConnection {
            state: self.state.clone(),
            pending: Vec::new(),
        }))
    }
}

struct FakeConnection {
    state: Arc<FakeState>,
    pending: Vec<Product>,
}

impl FakeConnection {
    fn check(&self) -> Result<()> {
        if self.state.failing_queries.load(Ordering::SeqCst) {
            return Err(PersistenceError::Store("simulated query failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for FakeConnection {
    async fn fetch_products(&mut self) -> Result<Vec<Product>> {
        self.check()?;
        self.state.listing_queries.fetch_add(1, Ordering::SeqCst);
        let snapshot = lock(&self.state.rows).clone();

        let gate = lock(&self.state.listing_gate).take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        Ok(snapshot)
    }

    async fn fetch_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        self.check()?;
        Ok(lock(&self.state.rows).iter().find(|p| p.id == id).cloned())
    }

    async fn fetch_by_category(&mut self, category: &str) -> Result<Vec<Product>> {
        self.check()?;
        Ok(lock(&self.state.rows)
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductId> {
        self.check()?;
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.push(product.clone().with_id(id));
        Ok(id)
    }

    async fn commit(&mut self) -> Result<()> {
        self.check()?;
        lock(&self.state.rows).append(&mut self.pending);
        Ok(())
    }

    async fn ping(&mut self) -> Result<()> {
        self.check()
    }

    async fn close(self: Box<Self>) {
        self.state.open_now.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// IN-MEMORY CACHE
// =============================================================================

/// Cache fake with TTL measured on the tokio clock.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    unavailable: AtomicBool,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the server were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Store a raw value without going through the trait
    pub fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
        lock(&self.entries).insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }

    /// Whether a live entry exists for `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries)
            .get(key)
            .is_some_and(|(_, expires)| *expires > Instant::now())
    }

    #[must_use]
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::CacheUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheClient for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut entries = lock(&self.entries);
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.insert_raw(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(lock(&self.entries).remove(key).is_some())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cache_entries_expire() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_uncommitted_inserts_are_invisible() {
        let store = FakeStore::new();
        let mut conn = store.open().await.unwrap();
        let id = conn
            .insert_product(&NewProduct::new("Lamp", "home", 10.0))
            .await
            .unwrap();
        conn.close().await;

        assert_eq!(id, 1);
        assert!(store.rows().is_empty());
        assert_eq!(store.open_connections(), 0);
    }
}
