//! Sources of the ordered ids behind a [`List`](super::List).

use std::ops::Range;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Error;

/// One page worth of ids, and the size of the sequence they were sliced from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdPage<I> {
    pub ids: Vec<I>,
    pub total_elements: usize,
}

/// Resolves the ids of a paginated sequence.
///
/// Every call re-derives the sequence, so pages follow the remote as it grows or shrinks.
pub trait IdSource<I>: Send + Sync {
    /// Resolves the ids of page `page` (1-based) with `page_size` ids per page.
    fn page(&self, page: usize, page_size: usize) -> BoxFuture<'static, Result<IdPage<I>, Error>>;

    /// Resolves the id at the absolute position `index` of the unpaginated sequence.
    fn nth(&self, index: usize) -> BoxFuture<'static, Result<Option<I>, Error>>;
}

type FetchIds<I> = dyn Fn() -> BoxFuture<'static, Result<Vec<I>, Error>> + Send + Sync;

/// The range of positions covered by `page` in a sequence of `total` ids.
///
/// The range is empty if the page starts past the end.
pub fn page_range(total: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = page.saturating_mul(page_size).min(total);
    start..end
}

/// An explicit, ordered id sequence, fetched as a whole.
pub struct Sequence<I> {
    fetch_ids: Arc<FetchIds<I>>,
}

impl<I> Sequence<I> {
    pub fn new<F>(fetch_ids: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<Vec<I>, Error>> + Send + Sync + 'static,
    {
        Self {
            fetch_ids: Arc::new(fetch_ids),
        }
    }
}

impl<I: Send + 'static> IdSource<I> for Sequence<I> {
    fn page(&self, page: usize, page_size: usize) -> BoxFuture<'static, Result<IdPage<I>, Error>> {
        let ids = (self.fetch_ids)();
        async move {
            let mut ids = ids.await?;
            let total_elements = ids.len();
            let range = page_range(total_elements, page, page_size);
            ids.truncate(range.end);
            ids.drain(..range.start);
            Ok(IdPage {
                ids,
                total_elements,
            })
        }
        .boxed()
    }

    fn nth(&self, index: usize) -> BoxFuture<'static, Result<Option<I>, Error>> {
        let ids = (self.fetch_ids)();
        async move { Ok(ids.await?.into_iter().nth(index)) }.boxed()
    }
}

type FetchMaxId = dyn Fn() -> BoxFuture<'static, Result<u64, Error>> + Send + Sync;

/// The ids `max..=1` in descending order, addressed only by the maximum id.
pub struct Watermark {
    fetch_max_id: Arc<FetchMaxId>,
}

impl Watermark {
    pub fn new<F>(fetch_max_id: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<u64, Error>> + Send + Sync + 'static,
    {
        Self {
            fetch_max_id: Arc::new(fetch_max_id),
        }
    }
}

/// The ids covered by `page` below the watermark `max_id`, in descending order.
///
/// Page `p` of size `s` covers `max_id - (p - 1) * s` down to `max_id - p * s + 1`, stopping at `1`.
pub fn watermark_ids(max_id: u64, page: usize, page_size: usize) -> Vec<u64> {
    let page_size = page_size as u64;
    let offset = (page.saturating_sub(1) as u64).saturating_mul(page_size);
    if offset >= max_id {
        return Vec::new();
    }
    let high = max_id - offset;
    let low = high.saturating_sub(page_size.saturating_sub(1)).max(1);
    (low..=high).rev().collect()
}

impl IdSource<u64> for Watermark {
    fn page(&self, page: usize, page_size: usize) -> BoxFuture<'static, Result<IdPage<u64>, Error>> {
        let max_id = (self.fetch_max_id)();
        async move {
            let max_id = max_id.await?;
            Ok(IdPage {
                ids: watermark_ids(max_id, page, page_size),
                total_elements: usize::try_from(max_id).unwrap_or(usize::MAX),
            })
        }
        .boxed()
    }

    fn nth(&self, index: usize) -> BoxFuture<'static, Result<Option<u64>, Error>> {
        let max_id = (self.fetch_max_id)();
        async move {
            let max_id = max_id.await?;
            Ok(u64::try_from(index)
                .ok()
                .filter(|index| *index < max_id)
                .map(|index| max_id - index))
        }
        .boxed()
    }
}
