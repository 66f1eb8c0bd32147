//! Support to fetch records over HTTP.

use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use hnapi_sources::{BaseUrl, ItemId, RawItem, RawUpdates, RawUser, StoryList};

use super::DataSource;
use crate::caching::{Cache, Payload};
use crate::error::FetchError;
use crate::utils::http::Timeouts;

/// A [`DataSource`] fetching JSON records from the remote API.
///
/// Every record is looked up in the cache first. Downloaded payloads are validated before they
/// are stored, so the cache never holds a record that fails to decode.
///
/// Fetching the list of recent updates evicts every item and profile it names from the cache.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
    client: Client,
    timeouts: Timeouts,
    base_url: Arc<BaseUrl>,
    cache: Arc<dyn Cache>,
}

impl HttpDataSource {
    pub fn new(
        client: Client,
        timeouts: Timeouts,
        base_url: BaseUrl,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            client,
            timeouts,
            base_url: Arc::new(base_url),
            cache,
        }
    }

    /// The URL all endpoints are relative to.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Fetches and decodes the record at `path`, going through the cache under `key`.
    async fn fetch<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T, FetchError> {
        let producer = async {
            let payload = self.download(path).await?;
            validate::<T>(&payload)?;
            Ok::<_, FetchError>(payload)
        };
        let payload = self.cache.get_or_set(key, producer.boxed()).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Downloads the JSON document at `path`.
    ///
    /// A body of `null` is how the remote reports records that do not exist.
    async fn download(&self, path: &str) -> Result<Payload, FetchError> {
        let url = self.base_url.endpoint(path);
        let endpoint = metric_endpoint(path);
        tracing::debug!("Fetching `{}`", url);

        metric!(counter("requests") += 1, "endpoint" => endpoint);
        let start = Instant::now();
        let result = tokio::time::timeout(self.timeouts.request, self.do_download(&url)).await;
        metric!(timer("requests.duration") = start.elapsed(), "endpoint" => endpoint);

        match result.map_err(|_| FetchError::Timeout(self.timeouts.request))? {
            Ok(Payload::Null) => Err(FetchError::NotFound),
            result => result,
        }
    }

    async fn do_download(&self, url: &str) -> Result<Payload, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| self.request_error(error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        response
            .json()
            .await
            .map_err(|error| self.request_error(error))
    }

    fn request_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeouts.request)
        } else if error.is_decode() {
            FetchError::Malformed(error.to_string())
        } else {
            FetchError::download_error(&error)
        }
    }
}

/// Infers the [`FetchError`] of an unsuccessful response from its status code.
fn status_error(url: &str, status: StatusCode) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            tracing::debug!("Insufficient permissions to fetch `{url}`: {status}");
            FetchError::PermissionDenied(status.to_string())
        }
        _ => {
            tracing::debug!("Unexpected status code from `{url}`: {status}");
            FetchError::DownloadError(status.to_string())
        }
    }
}

/// Checks that `payload` decodes into a `T`.
fn validate<T: DeserializeOwned>(payload: &Payload) -> Result<(), FetchError> {
    T::deserialize(payload)?;
    Ok(())
}

/// The metric tag of a path, without any ids or usernames in it.
fn metric_endpoint(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

fn item_key(id: ItemId) -> String {
    format!("item/{id}")
}

fn user_key(name: &str) -> String {
    format!("user/{name}")
}

impl DataSource for HttpDataSource {
    fn fetch_item(&self, id: ItemId) -> BoxFuture<'static, Result<RawItem, FetchError>> {
        let this = self.clone();
        async move {
            let key = item_key(id);
            this.fetch(&key, &key).await
        }
        .boxed()
    }

    fn fetch_user(&self, name: &str) -> BoxFuture<'static, Result<RawUser, FetchError>> {
        let this = self.clone();
        let key = user_key(name);
        async move { this.fetch(&key, &key).await }.boxed()
    }

    fn fetch_story_ids(
        &self,
        list: StoryList,
    ) -> BoxFuture<'static, Result<Vec<ItemId>, FetchError>> {
        let this = self.clone();
        async move {
            let endpoint = list.endpoint();
            this.fetch(endpoint, endpoint).await
        }
        .boxed()
    }

    fn fetch_updates(&self) -> BoxFuture<'static, Result<RawUpdates, FetchError>> {
        let this = self.clone();
        async move {
            let producer = async {
                let payload = this.download("updates").await?;
                let updates: RawUpdates = serde_json::from_value(payload.clone())?;

                tracing::debug!(
                    items = updates.items.len(),
                    profiles = updates.profiles.len(),
                    "Evicting updated records"
                );
                for id in &updates.items {
                    this.cache.remove(&item_key(*id)).await;
                }
                for name in &updates.profiles {
                    this.cache.remove(&user_key(name)).await;
                }

                Ok::<_, FetchError>(payload)
            };
            let payload = this.cache.get_or_set("updates", producer.boxed()).await?;
            Ok(serde_json::from_value(payload)?)
        }
        .boxed()
    }

    fn fetch_max_item(&self) -> BoxFuture<'static, Result<ItemId, FetchError>> {
        let this = self.clone();
        async move { this.fetch("maxitem", "maxitem").await }.boxed()
    }
}
