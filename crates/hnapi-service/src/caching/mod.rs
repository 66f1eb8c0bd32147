//! Caching of fetched payloads.
//!
//! Everything the [`DataSource`](crate::download::DataSource) fetches goes through a [`Cache`].
//! The default implementation is the in-memory [`TtlCache`], which evicts every entry a fixed
//! time after it was stored. Callers can plug in their own implementation, like the
//! [`NoopCache`] which does not store anything.

use std::fmt;

use futures::future::{BoxFuture, FutureExt};

use crate::error::FetchError;

mod memory;

pub use memory::TtlCache;

/// An opaque payload stored in a [`Cache`], usually the raw JSON of a record.
pub type Payload = serde_json::Value;

/// A key/value store of fetched payloads.
///
/// Implementations must tolerate concurrent calls for the same key from overlapping fetches.
/// They do not need to serialize concurrent population of the same key, see
/// [`get_or_set`](Self::get_or_set).
pub trait Cache: fmt::Debug + Send + Sync {
    /// Returns the payload stored under `key`, or `None` if it is absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<Payload>>;

    /// Stores `value` under `key`, replacing any previous entry and restarting its expiry.
    fn set<'a>(&'a self, key: &'a str, value: Payload) -> BoxFuture<'a, ()>;

    /// Evicts `key`. Does nothing if it is absent.
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()>;

    /// Returns the payload stored under `key`, or runs `producer` and stores its result.
    ///
    /// `producer` is only polled on a miss, and its failures are returned without being cached.
    /// Two calls for the same key racing on a miss may both run their producer.
    fn get_or_set<'a>(
        &'a self,
        key: &'a str,
        producer: BoxFuture<'a, Result<Payload, FetchError>>,
    ) -> BoxFuture<'a, Result<Payload, FetchError>> {
        async move {
            if let Some(value) = self.get(key).await {
                tracing::trace!(key, "cache hit");
                metric!(counter("cache.access") += 1, "hit" => "true");
                return Ok(value);
            }

            tracing::trace!(key, "cache miss");
            metric!(counter("cache.access") += 1, "hit" => "false");
            let value = producer.await?;
            self.set(key, value.clone()).await;
            Ok(value)
        }
        .boxed()
    }
}

/// A [`Cache`] that never stores anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;

impl Cache for NoopCache {
    fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Option<Payload>> {
        futures::future::ready(None).boxed()
    }

    fn set<'a>(&'a self, _key: &'a str, _value: Payload) -> BoxFuture<'a, ()> {
        futures::future::ready(()).boxed()
    }

    fn remove<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, ()> {
        futures::future::ready(()).boxed()
    }
}
