//! The public entry point: lazily fetched items, users and story lists.

use std::sync::Arc;
use std::time::Duration;

use futures::TryFutureExt;

use hnapi_sources::{BaseUrl, ItemId, StoryList, Username};

use crate::caching::{Cache, NoopCache, TtlCache};
use crate::config::{Config, DEFAULT_CACHE_TTL};
use crate::download::{DataSource, HttpDataSource};
use crate::error::{Error, FetchError};
use crate::lazy::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE, List, ListSettings};
use crate::types::{ItemElement, Items, UserElement, Users};
use crate::utils::http::{Timeouts, USER_AGENT, create_client};

mod assemble;

/// Settings of a [`HnApi`] talking to the remote over HTTP.
#[derive(Clone, Debug)]
pub struct ApiSettings {
    /// The cache consulted for every record.
    pub cache: Arc<dyn Cache>,
    /// The number of elements per page of every list.
    pub page_size: usize,
    /// The number of records fetched concurrently when resolving a page.
    pub max_concurrency: usize,
    /// The root of the remote API.
    pub base_url: BaseUrl,
    /// Timeouts of the HTTP client.
    pub timeouts: Timeouts,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl ApiSettings {
    /// Checks the pagination settings and returns them as [`ListSettings`] of the first page.
    pub fn list_settings(&self) -> Result<ListSettings, Error> {
        ListSettings::new(1, self.page_size, self.max_concurrency)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            cache: Arc::new(TtlCache::new(DEFAULT_CACHE_TTL)),
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            base_url: BaseUrl::default(),
            timeouts: Timeouts::default(),
            user_agent: USER_AGENT.into(),
        }
    }
}

/// Lazy access to the items and users of the remote dataset.
///
/// Every method returns immediately without doing any I/O. The returned [`Element`]s and
/// [`List`]s fetch their data when awaited, and reference related entities lazily again.
///
/// Cloning is cheap; clones share the data source and its cache.
///
/// [`Element`]: crate::lazy::Element
#[derive(Clone, Debug)]
pub struct HnApi {
    source: Arc<dyn DataSource>,
    settings: ListSettings,
}

impl HnApi {
    /// Creates an API fetching from the remote over HTTP.
    ///
    /// Fails with [`Error::InvalidArgument`] if the page size or concurrency is `0`.
    pub fn new(settings: ApiSettings) -> Result<Self, Error> {
        let list_settings = settings.list_settings()?;
        let client = create_client(&settings.timeouts, &settings.user_agent)
            .map_err(|error| FetchError::download_error(&error))?;
        let source = HttpDataSource::new(
            client,
            settings.timeouts,
            settings.base_url,
            settings.cache,
        );
        Ok(Self::from_source(Arc::new(source), list_settings))
    }

    /// Creates an API on top of an arbitrary [`DataSource`].
    pub fn from_source(source: Arc<dyn DataSource>, settings: ListSettings) -> Self {
        Self { source, settings }
    }

    /// Creates an API from the configuration file.
    ///
    /// A `cache_ttl` of zero disables caching.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache: Arc<dyn Cache> = if config.cache_ttl == Duration::ZERO {
            Arc::new(NoopCache)
        } else {
            Arc::new(TtlCache::new(config.cache_ttl))
        };

        let settings = ApiSettings {
            cache,
            page_size: config.page_size,
            max_concurrency: config.max_concurrency,
            base_url: config.base_url.clone(),
            timeouts: config.timeouts,
            user_agent: config.user_agent.clone(),
        };
        Ok(Self::new(settings)?)
    }

    /// The pagination settings every list starts with.
    pub fn settings(&self) -> ListSettings {
        self.settings
    }

    /// The item with the given id.
    pub fn item(&self, id: ItemId) -> ItemElement {
        self.item_element(id)
    }

    /// The user with the given name.
    pub fn user(&self, name: impl Into<Username>) -> UserElement {
        self.user_element(name.into())
    }

    /// The stories of a named list, in the order the remote ranks them.
    pub fn stories(&self, list: StoryList) -> Items {
        let source = Arc::clone(&self.source);
        let api = self.clone();
        List::new(
            move || source.fetch_story_ids(list).map_err(Error::from),
            move |id| api.item_element(id),
            self.settings,
        )
    }

    /// Up to 500 top stories.
    pub fn top_stories(&self) -> Items {
        self.stories(StoryList::Top)
    }

    /// Up to 500 newest stories.
    pub fn new_stories(&self) -> Items {
        self.stories(StoryList::New)
    }

    /// Up to 500 best stories.
    pub fn best_stories(&self) -> Items {
        self.stories(StoryList::Best)
    }

    /// Up to 200 latest "Ask HN" stories.
    pub fn ask_stories(&self) -> Items {
        self.stories(StoryList::Ask)
    }

    /// Up to 200 latest "Show HN" stories.
    pub fn show_stories(&self) -> Items {
        self.stories(StoryList::Show)
    }

    /// Up to 200 latest job postings.
    pub fn job_stories(&self) -> Items {
        self.stories(StoryList::Job)
    }

    /// Items that changed recently.
    ///
    /// Fetching this list evicts the changed items from the cache.
    pub fn changed_items(&self) -> Items {
        let source = Arc::clone(&self.source);
        let api = self.clone();
        List::new(
            move || {
                source
                    .fetch_updates()
                    .map_ok(|updates| updates.items)
                    .map_err(Error::from)
            },
            move |id| api.item_element(id),
            self.settings,
        )
    }

    /// Users whose profiles changed recently.
    ///
    /// Fetching this list evicts the changed profiles from the cache.
    pub fn changed_users(&self) -> Users {
        let source = Arc::clone(&self.source);
        let api = self.clone();
        List::new(
            move || {
                source
                    .fetch_updates()
                    .map_ok(|updates| updates.profiles)
                    .map_err(Error::from)
            },
            move |name| api.user_element(name),
            self.settings,
        )
    }

    /// Every item ever posted, newest first.
    ///
    /// The ids are not fetched, but derived from the largest id: page `p` of size `s` covers
    /// the ids `max - (p - 1) * s` down to `max - p * s + 1`.
    pub fn all_items(&self) -> Items {
        let source = Arc::clone(&self.source);
        let api = self.clone();
        List::watermark(
            move || source.fetch_max_item().map_err(Error::from),
            move |id| api.item_element(id),
            self.settings,
        )
    }
}
