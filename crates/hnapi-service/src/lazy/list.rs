use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;

use super::batch::fetch_batched;
use super::pager::{IdPage, IdSource, Sequence, Watermark};
use super::Element;
use crate::error::Error;

/// The default number of elements per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The default number of elements resolved concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Pagination and concurrency settings of a [`List`].
///
/// All values are at least `1`; this is checked when the settings are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSettings {
    page: usize,
    page_size: usize,
    max_concurrency: usize,
}

impl ListSettings {
    /// Validates and creates settings.
    pub fn new(page: usize, page_size: usize, max_concurrency: usize) -> Result<Self, Error> {
        Self::default()
            .with_page(page)?
            .with_page_size(page_size)?
            .with_max_concurrency(max_concurrency)
    }

    /// The 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// The number of elements per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The number of elements resolved concurrently.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Returns a copy with a different page.
    pub fn with_page(self, page: usize) -> Result<Self, Error> {
        if page < 1 {
            return Err(Error::invalid_argument("page", page));
        }
        Ok(Self { page, ..self })
    }

    /// Returns a copy with a different page size.
    pub fn with_page_size(self, page_size: usize) -> Result<Self, Error> {
        if page_size < 1 {
            return Err(Error::invalid_argument("page_size", page_size));
        }
        Ok(Self { page_size, ..self })
    }

    /// Returns a copy with a different concurrency.
    pub fn with_max_concurrency(self, max_concurrency: usize) -> Result<Self, Error> {
        if max_concurrency < 1 {
            return Err(Error::invalid_argument("max_concurrency", max_concurrency));
        }
        Ok(Self {
            max_concurrency,
            ..self
        })
    }
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// One page of a [`List`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// The values on this page, in list order. Never more than `page_size`.
    pub elements: Vec<T>,
    /// The 1-based page number.
    pub page: usize,
    /// The requested number of elements per page.
    pub page_size: usize,
    /// `ceil(total_elements / page_size)`.
    pub total_pages: usize,
    /// The length of the whole list at the time it was fetched.
    pub total_elements: usize,
}

type Factory<V, I> = dyn Fn(I) -> Element<V, I> + Send + Sync;

/// A lazily fetched, paginated sequence of [`Element`]s.
///
/// A list is built from a source of ordered ids and a factory turning each id into an element.
/// It performs no work until [`fetch`](Self::fetch) is awaited, and every fetch re-derives the
/// page from the current id sequence.
///
/// Lists are immutable: [`set_page`](Self::set_page), [`set_page_size`](Self::set_page_size) and
/// [`map`](Self::map) return new lists sharing the id source of the original.
pub struct List<V, I> {
    ids: Arc<dyn IdSource<I>>,
    factory: Arc<Factory<V, I>>,
    settings: ListSettings,
}

impl<V, I> Clone for List<V, I> {
    fn clone(&self) -> Self {
        Self {
            ids: Arc::clone(&self.ids),
            factory: Arc::clone(&self.factory),
            settings: self.settings,
        }
    }
}

impl<V, I> fmt::Debug for List<V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<V, I> List<V, I>
where
    V: Send + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Creates a list over the ids returned by `fetch_ids`.
    pub fn new<FI, Fut, FE>(fetch_ids: FI, factory: FE, settings: ListSettings) -> Self
    where
        FI: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<I>, Error>> + Send + 'static,
        FE: Fn(I) -> Element<V, I> + Send + Sync + 'static,
    {
        Self::from_source(
            Sequence::new(move || fetch_ids().boxed()),
            factory,
            settings,
        )
    }

    /// Creates a list over ids that are already known.
    pub fn from_ids<FE>(ids: Vec<I>, factory: FE, settings: ListSettings) -> Self
    where
        FE: Fn(I) -> Element<V, I> + Send + Sync + 'static,
    {
        let ids = Arc::new(ids);
        Self::new(
            move || future::ready(Ok(Vec::clone(&ids))),
            factory,
            settings,
        )
    }

    /// Creates a list over an arbitrary [`IdSource`].
    pub fn from_source<S, FE>(ids: S, factory: FE, settings: ListSettings) -> Self
    where
        S: IdSource<I> + 'static,
        FE: Fn(I) -> Element<V, I> + Send + Sync + 'static,
    {
        Self {
            ids: Arc::new(ids),
            factory: Arc::new(factory),
            settings,
        }
    }

    /// The current settings.
    pub fn settings(&self) -> ListSettings {
        self.settings
    }

    /// Returns a copy of this list showing page `page`. `page` must be at least `1`.
    pub fn set_page(&self, page: usize) -> Result<Self, Error> {
        self.with_settings(self.settings.with_page(page)?)
    }

    /// Returns a copy of this list with `page_size` elements per page. `page_size` must be at
    /// least `1`.
    pub fn set_page_size(&self, page_size: usize) -> Result<Self, Error> {
        self.with_settings(self.settings.with_page_size(page_size)?)
    }

    /// Returns a copy of this list resolving `max_concurrency` elements at a time.
    pub fn set_max_concurrency(&self, max_concurrency: usize) -> Result<Self, Error> {
        self.with_settings(self.settings.with_max_concurrency(max_concurrency)?)
    }

    fn with_settings(&self, settings: ListSettings) -> Result<Self, Error> {
        Ok(Self {
            settings,
            ..self.clone()
        })
    }

    /// Fetches the current page.
    ///
    /// Resolves the id sequence once, slices out the page, and resolves the elements of that
    /// page with at most `max_concurrency` requests in flight. Either all values of the page are
    /// returned, or the first failure.
    pub fn fetch(&self) -> BoxFuture<'static, Result<Page<V>, Error>> {
        let ids = Arc::clone(&self.ids);
        let factory = Arc::clone(&self.factory);
        let settings = self.settings;

        async move {
            let IdPage {
                ids,
                total_elements,
            } = ids.page(settings.page, settings.page_size).await?;

            let resolved = fetch_batched(ids, |id| factory(id), settings.max_concurrency).await?;

            Ok(Page {
                elements: resolved.into_iter().map(|(_, value)| value).collect(),
                page: settings.page,
                page_size: settings.page_size,
                total_pages: total_elements.div_ceil(settings.page_size),
                total_elements,
            })
        }
        .boxed()
    }

    /// Returns the element at the absolute position `index` of the unpaginated list.
    ///
    /// The id resolves to `None` if the list is shorter than `index + 1` at the time it is
    /// resolved, in which case fetching the value fails with [`Error::OutOfRange`].
    pub fn get_item(&self, index: usize) -> Element<V, Option<I>> {
        let ids = Arc::clone(&self.ids);
        let factory = Arc::clone(&self.factory);

        Element::new(
            move || ids.nth(index),
            move |id| {
                let element = id.map(|id| factory(id));
                async move {
                    match element {
                        Some(element) => element.fetch().await,
                        None => Err(Error::OutOfRange(index)),
                    }
                }
            },
        )
    }

    /// Transforms every value of this list with `f`.
    pub fn map<O, F>(&self, f: F) -> List<O, I>
    where
        O: Send + 'static,
        F: Fn(V) -> O + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.compose(move |element| {
            let f = Arc::clone(&f);
            element.map(move |value| f(value))
        })
    }

    /// Transforms every value of this list with an asynchronous, fallible `f`.
    pub fn and_then<O, F, Fut>(&self, f: F) -> List<O, I>
    where
        O: Send + 'static,
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, Error>> + Send + 'static,
    {
        let f = Arc::new(f);
        self.compose(move |element| {
            let f = Arc::clone(&f);
            element.and_then(move |value| f(value))
        })
    }

    fn compose<O, C>(&self, compose: C) -> List<O, I>
    where
        O: Send + 'static,
        C: Fn(Element<V, I>) -> Element<O, I> + Send + Sync + 'static,
    {
        let factory = Arc::clone(&self.factory);
        List {
            ids: Arc::clone(&self.ids),
            factory: Arc::new(move |id: I| compose(factory(id))),
            settings: self.settings,
        }
    }
}

impl<V: Send + 'static> List<V, u64> {
    /// Creates a list of the ids `max..=1` in descending order, where `max` is returned by
    /// `fetch_max_id`.
    pub fn watermark<FM, Fut, FE>(fetch_max_id: FM, factory: FE, settings: ListSettings) -> Self
    where
        FM: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u64, Error>> + Send + 'static,
        FE: Fn(u64) -> Element<V, u64> + Send + Sync + 'static,
    {
        Self::from_source(
            Watermark::new(move || fetch_max_id().boxed()),
            factory,
            settings,
        )
    }
}
