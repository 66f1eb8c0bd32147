//! Fetching raw records from the remote dataset.
//!
//! The lazy layer only talks to the remote through the [`DataSource`] contract. The default
//! implementation is [`HttpDataSource`], which fetches JSON over HTTP and consults a
//! [`Cache`](crate::caching::Cache) for every request.

use std::fmt;

use futures::future::BoxFuture;

use hnapi_sources::{ItemId, RawItem, RawUpdates, RawUser, StoryList};

use crate::error::FetchError;

mod http;

pub use self::http::HttpDataSource;

/// Translates typed record requests into raw records.
///
/// Every method returns an owned future, so that the lazy closures capturing a source stay
/// `'static`. Implementations may consult and populate a cache internally.
pub trait DataSource: fmt::Debug + Send + Sync {
    /// Fetches an item by id.
    fn fetch_item(&self, id: ItemId) -> BoxFuture<'static, Result<RawItem, FetchError>>;

    /// Fetches a user profile by username.
    fn fetch_user(&self, name: &str) -> BoxFuture<'static, Result<RawUser, FetchError>>;

    /// Fetches the ordered ids of a named story list.
    fn fetch_story_ids(
        &self,
        list: StoryList,
    ) -> BoxFuture<'static, Result<Vec<ItemId>, FetchError>>;

    /// Fetches the ids of recently changed items and profiles.
    fn fetch_updates(&self) -> BoxFuture<'static, Result<RawUpdates, FetchError>>;

    /// Fetches the largest item id that currently exists.
    fn fetch_max_item(&self) -> BoxFuture<'static, Result<ItemId, FetchError>>;
}
