use std::fmt;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};

use super::{Cache, Payload};

/// The default number of entries kept by a [`TtlCache`].
const DEFAULT_CAPACITY: u64 = 100_000;

/// An item saved in the in-memory moka cache.
#[derive(Clone, Debug)]
struct InMemoryItem {
    /// When to evict this item, fixed when it is stored.
    deadline: Instant,
    /// The actual data.
    payload: Payload,
}

/// A struct implementing [`moka::Expiry`] that uses the [`InMemoryItem`] [`Instant`] as the explicit
/// expiration time.
///
/// Reads keep the current expiry, so only a new `set` moves the deadline.
struct TtlExpiration;

impl moka::Expiry<String, InMemoryItem> for TtlExpiration {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &InMemoryItem,
        current_time: Instant,
    ) -> Option<Duration> {
        Some(value.deadline.saturating_duration_since(current_time))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &InMemoryItem,
        current_time: Instant,
        _current_duration: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.deadline.saturating_duration_since(current_time))
    }
}

/// An in-memory [`Cache`] evicting every entry `ttl` after it was last `set`.
///
/// Expiry is scheduled per entry when it is stored, and an expired entry is never returned
/// from [`get`](Cache::get), even if its eviction has not run yet.
///
/// Clones share the same underlying storage.
#[derive(Clone)]
pub struct TtlCache {
    ttl: Duration,
    inner: moka::future::Cache<String, InMemoryItem>,
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("in-memory items", &self.inner.entry_count())
            .finish()
    }
}

impl TtlCache {
    /// Creates a cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    /// Creates a cache with the given time-to-live, holding at most `capacity` entries.
    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        let inner = moka::future::Cache::builder()
            .name("payloads")
            .max_capacity(capacity)
            .expire_after(TtlExpiration)
            .build();

        Self { ttl, inner }
    }

    /// The time-to-live of new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Cache for TtlCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<Payload>> {
        async move { self.inner.get(key).await.map(|item| item.payload) }.boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: Payload) -> BoxFuture<'a, ()> {
        async move {
            let item = InMemoryItem {
                deadline: Instant::now() + self.ttl,
                payload: value,
            };
            self.inner.insert(key.to_owned(), item).await;
        }
        .boxed()
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()> {
        async move { self.inner.invalidate(key).await }.boxed()
    }
}
