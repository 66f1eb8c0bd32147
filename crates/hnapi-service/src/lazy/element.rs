use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::Error;

type ResolveId<I> = dyn Fn() -> BoxFuture<'static, Result<I, Error>> + Send + Sync;
type ResolveValue<V, I> = dyn Fn(I) -> BoxFuture<'static, Result<V, Error>> + Send + Sync;

/// A single lazily fetched value, addressed by a lazily resolved id.
///
/// An `Element` is a pair of deferred steps: one resolving the id, and one resolving the
/// value for that id. Nothing runs until [`fetch`](Self::fetch) or [`id`](Self::id) is awaited,
/// and nothing is memoized: every call resolves again, relying on the
/// [`Cache`](crate::caching::Cache) behind the data source to avoid repeated requests.
///
/// Transformations like [`map`](Self::map) return new, independent elements that share the
/// (immutable) resolution steps of the original.
pub struct Element<V, I> {
    resolve_id: Arc<ResolveId<I>>,
    resolve_value: Arc<ResolveValue<V, I>>,
}

impl<V, I> Clone for Element<V, I> {
    fn clone(&self) -> Self {
        Self {
            resolve_id: Arc::clone(&self.resolve_id),
            resolve_value: Arc::clone(&self.resolve_value),
        }
    }
}

impl<V, I> fmt::Debug for Element<V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element").finish_non_exhaustive()
    }
}

impl<V, I> Element<V, I>
where
    V: Send + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Creates an element from its id and value resolution steps.
    pub fn new<FI, FutI, FV, FutV>(resolve_id: FI, resolve_value: FV) -> Self
    where
        FI: Fn() -> FutI + Send + Sync + 'static,
        FutI: Future<Output = Result<I, Error>> + Send + 'static,
        FV: Fn(I) -> FutV + Send + Sync + 'static,
        FutV: Future<Output = Result<V, Error>> + Send + 'static,
    {
        Self {
            resolve_id: Arc::new(move || resolve_id().boxed()),
            resolve_value: Arc::new(move |id| resolve_value(id).boxed()),
        }
    }

    /// Creates an element whose id is already known.
    pub fn with_id<FV, FutV>(id: I, resolve_value: FV) -> Self
    where
        FV: Fn(I) -> FutV + Send + Sync + 'static,
        FutV: Future<Output = Result<V, Error>> + Send + 'static,
    {
        Self::new(move || future::ready(Ok(id.clone())), resolve_value)
    }

    /// Resolves the id, then the value for that id.
    ///
    /// Failures of either step are returned unchanged.
    pub fn fetch(&self) -> BoxFuture<'static, Result<V, Error>> {
        let resolve_id = Arc::clone(&self.resolve_id);
        let resolve_value = Arc::clone(&self.resolve_value);
        async move {
            let id = resolve_id().await?;
            resolve_value(id).await
        }
        .boxed()
    }

    /// Resolves the id once, then the value for it, returning both.
    pub fn fetch_with_id(&self) -> BoxFuture<'static, Result<(I, V), Error>> {
        let resolve_id = Arc::clone(&self.resolve_id);
        let resolve_value = Arc::clone(&self.resolve_value);
        async move {
            let id = resolve_id().await?;
            let value = resolve_value(id.clone()).await?;
            Ok((id, value))
        }
        .boxed()
    }

    /// Resolves only the id, without fetching the value.
    pub fn id(&self) -> BoxFuture<'static, Result<I, Error>> {
        (self.resolve_id)()
    }

    /// Transforms the value with `f` once it is fetched.
    pub fn map<O, F>(&self, f: F) -> Element<O, I>
    where
        O: Send + 'static,
        F: Fn(V) -> O + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.and_then(move |value| {
            let f = Arc::clone(&f);
            async move { Ok(f(value)) }
        })
    }

    /// Transforms the value with an asynchronous, fallible `f` once it is fetched.
    pub fn and_then<O, F, Fut>(&self, f: F) -> Element<O, I>
    where
        O: Send + 'static,
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, Error>> + Send + 'static,
    {
        let resolve_value = Arc::clone(&self.resolve_value);
        let f = Arc::new(f);
        Element {
            resolve_id: Arc::clone(&self.resolve_id),
            resolve_value: Arc::new(move |id| {
                let value = resolve_value(id);
                let f = Arc::clone(&f);
                async move { f(value.await?).await }.boxed()
            }),
        }
    }

    /// Passes the value through if it satisfies `predicate`, and fails with
    /// [`Error::Mismatch`] otherwise.
    pub fn ensure<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.ensure_or(predicate, |_| Error::Mismatch)
    }

    /// Passes the value through if it satisfies `predicate`, and fails with the error built by
    /// `error` from the rejected value otherwise.
    pub fn ensure_or<P, E>(&self, predicate: P, error: E) -> Self
    where
        P: Fn(&V) -> bool + Send + Sync + 'static,
        E: Fn(&V) -> Error + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let error = Arc::new(error);
        self.and_then(move |value| {
            let result = if predicate(&value) {
                Ok(value)
            } else {
                Err(error(&value))
            };
            future::ready(result)
        })
    }

    /// Narrows the value with `f`, failing with the error built by `error` when `f` hands the
    /// value back.
    ///
    /// This is the typed counterpart of [`ensure_or`](Self::ensure_or) for variant values.
    pub fn narrow<O, F, E>(&self, f: F, error: E) -> Element<O, I>
    where
        O: Send + 'static,
        F: Fn(V) -> Result<O, V> + Send + Sync + 'static,
        E: Fn(&V) -> Error + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let error = Arc::new(error);
        self.and_then(move |value| future::ready(f(value).map_err(|value| error(&value))))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::FetchError;

    use super::*;

    fn counted(ids: &Arc<AtomicUsize>, values: &Arc<AtomicUsize>) -> Element<u64, u64> {
        let ids = Arc::clone(ids);
        let values = Arc::clone(values);
        Element::new(
            move || {
                ids.fetch_add(1, Ordering::SeqCst);
                future::ready(Ok(7))
            },
            move |id| {
                values.fetch_add(1, Ordering::SeqCst);
                future::ready(Ok(id * 10))
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_is_lazy_and_not_memoized() {
        let ids = Arc::new(AtomicUsize::new(0));
        let values = Arc::new(AtomicUsize::new(0));
        let element = counted(&ids, &values);

        assert_eq!(ids.load(Ordering::SeqCst), 0);
        assert_eq!(values.load(Ordering::SeqCst), 0);

        assert_eq!(element.fetch().await, Ok(70));
        assert_eq!(element.fetch().await, Ok(70));
        assert_eq!(ids.load(Ordering::SeqCst), 2);
        assert_eq!(values.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_id_does_not_resolve_value() {
        let ids = Arc::new(AtomicUsize::new(0));
        let values = Arc::new(AtomicUsize::new(0));
        let element = counted(&ids, &values);

        assert_eq!(element.id().await, Ok(7));
        assert_eq!(ids.load(Ordering::SeqCst), 1);
        assert_eq!(values.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_id_failure_skips_value() {
        let values = Arc::new(AtomicUsize::new(0));
        let element: Element<u64, u64> = {
            let values = Arc::clone(&values);
            Element::new(
                || future::ready(Err(Error::from(FetchError::NotFound))),
                move |id| {
                    values.fetch_add(1, Ordering::SeqCst);
                    future::ready(Ok(id))
                },
            )
        };

        assert_eq!(element.fetch().await, Err(Error::Fetch(FetchError::NotFound)));
        assert_eq!(values.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_map_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let element = Element::with_id(3u64, |id| future::ready(Ok(id)));

        let mapped = {
            let calls = Arc::clone(&calls);
            element.map(move |value| {
                calls.fetch_add(1, Ordering::SeqCst);
                value.to_string()
            })
        };
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(mapped.fetch().await, Ok("3".to_owned()));
        assert_eq!(mapped.id().await, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // the original is unaffected
        assert_eq!(element.fetch().await, Ok(3));
    }

    #[tokio::test]
    async fn test_and_then_may_suspend() {
        let element = Element::with_id(2u64, |id| future::ready(Ok(id)));
        let mapped = element.and_then(|value| async move {
            tokio::task::yield_now().await;
            Ok(value * 21)
        });
        assert_eq!(mapped.fetch().await, Ok(42));
    }

    #[tokio::test]
    async fn test_map_propagates_failure() {
        let element: Element<u64, u64> = Element::with_id(1, |_| {
            future::ready(Err(Error::from(FetchError::DownloadError(
                "502 Bad Gateway".into(),
            ))))
        });
        let mapped = element.map(|value| value + 1);
        assert_eq!(
            mapped.fetch().await,
            Err(Error::Fetch(FetchError::DownloadError(
                "502 Bad Gateway".into()
            )))
        );
    }

    #[tokio::test]
    async fn test_ensure() {
        let element = Element::with_id(4u64, |id| future::ready(Ok(id)));

        assert_eq!(element.ensure(|value| value % 2 == 0).fetch().await, Ok(4));
        assert_eq!(
            element.ensure(|value| value % 2 == 1).fetch().await,
            Err(Error::Mismatch)
        );
        assert_eq!(
            element
                .ensure_or(
                    |value| *value > 10,
                    |value| Error::Rejected(format!("{value} is too small")),
                )
                .fetch()
                .await,
            Err(Error::Rejected("4 is too small".into()))
        );
    }

    #[tokio::test]
    async fn test_narrow() {
        let element = Element::with_id(1u64, |_| future::ready(Ok(Ok::<u8, String>(5))));
        let narrowed = element.narrow(|value| value.map_err(Err), |_| Error::Mismatch);
        assert_eq!(narrowed.fetch().await, Ok(5));

        let element = Element::with_id(1u64, |_| future::ready(Ok(Err::<u8, String>("no".into()))));
        let narrowed = element.narrow(
            |value| value.map_err(Err),
            |value| Error::Rejected(format!("{value:?}")),
        );
        assert_eq!(
            narrowed.fetch().await,
            Err(Error::Rejected("Err(\"no\")".into()))
        );
    }
}
