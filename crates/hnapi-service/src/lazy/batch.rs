//! Resolves many elements with a bounded number of requests in flight.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};

use super::Element;
use crate::error::Error;

type Resolving<I, V> = BoxFuture<'static, (usize, Result<(I, V), Error>)>;

/// Resolves the element of every id, at most `max_concurrency` at a time.
///
/// The ids are split into consecutive groups of `max_concurrency`. All elements of a group are
/// resolved concurrently, and the whole group completes before the next one starts. The
/// returned pairs are in the order of `ids`, regardless of the order in which they completed.
///
/// The first failure fails the whole operation without waiting for the rest of its group.
/// The remaining requests of that group are not cancelled: they are handed to the runtime and
/// left to complete in the background.
///
/// `max_concurrency` must be at least `1`.
pub async fn fetch_batched<V, I, F>(
    ids: Vec<I>,
    factory: F,
    max_concurrency: usize,
) -> Result<Vec<(I, V)>, Error>
where
    V: Send + 'static,
    I: Clone + Send + Sync + 'static,
    F: Fn(I) -> Element<V, I>,
{
    if max_concurrency == 0 {
        return Err(Error::invalid_argument("max_concurrency", max_concurrency));
    }

    metric!(histogram("batch.size") = ids.len() as u64);

    let mut resolved = Vec::with_capacity(ids.len());
    for group in ids.chunks(max_concurrency) {
        let mut pending: FuturesUnordered<Resolving<I, V>> = group
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, id)| {
                let element = factory(id);
                element
                    .fetch_with_id()
                    .map(move |result| (index, result))
                    .boxed()
            })
            .collect();

        let mut slots: Vec<Option<(I, V)>> = (0..group.len()).map(|_| None).collect();
        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(pair) => slots[index] = Some(pair),
                Err(error) => {
                    for sibling in pending {
                        tokio::spawn(sibling);
                    }
                    return Err(error);
                }
            }
        }

        resolved.extend(slots.into_iter().flatten());
    }

    Ok(resolved)
}
