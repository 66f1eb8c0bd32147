use std::sync::Arc;
use std::time::Duration;

use hnapi_service::caching::{Cache, TtlCache};
use hnapi_service::config::Config;
use hnapi_service::download::HttpDataSource;
use hnapi_service::utils::http::{Timeouts, USER_AGENT, create_client};
use hnapi_service::HnApi;
use hnapi_test as test;
use serde_json::json;

pub use test::MockApi;

/// Setup tests and create an API talking to `mock`.
///
/// The `update_config` closure can modify any default configuration if needed before the API
/// is created.
pub fn setup_api(mock: &MockApi, update_config: impl FnOnce(&mut Config)) -> HnApi {
    test::setup();

    let mut config = Config {
        base_url: mock.base_url().parse().unwrap(),
        ..Default::default()
    };
    update_config(&mut config);

    HnApi::from_config(&config).unwrap()
}

/// Creates a data source fetching from `base_url`, with a cache holding records for `ttl`.
pub fn setup_source(base_url: &str, ttl: Duration) -> (HttpDataSource, Arc<TtlCache>) {
    test::setup();

    let cache = Arc::new(TtlCache::new(ttl));
    let source = source_with_cache(base_url, cache.clone(), Timeouts::default());
    (source, cache)
}

pub fn source_with_cache(
    base_url: &str,
    cache: Arc<dyn Cache>,
    timeouts: Timeouts,
) -> HttpDataSource {
    let client = create_client(&timeouts, USER_AGENT).unwrap();
    HttpDataSource::new(client, timeouts, base_url.parse().unwrap(), cache)
}

/// Serves a story with two comments written by two users, and lists it as the top story.
pub fn populate(mock: &MockApi) {
    mock.insert_item(json!({
        "id": 8863, "type": "story", "by": "dhouston", "time": 1175714200,
        "title": "My YC app: Dropbox - Throw away your USB drive",
        "url": "http://www.getdropbox.com/u/2/screencast.html",
        "score": 111, "descendants": 2, "kids": [9224, 8917],
    }));
    mock.insert_item(json!({
        "id": 9224, "type": "comment", "by": "BrandonM", "time": 1175727286,
        "parent": 8863, "text": "For a Linux user, you can already build such a system yourself.",
    }));
    mock.insert_item(json!({
        "id": 8917, "type": "comment", "by": "dhouston", "time": 1175720000,
        "parent": 8863, "text": "thanks!",
    }));
    mock.insert_user(json!({
        "id": "dhouston", "created": 1173923446, "karma": 2937,
        "about": "Dropbox", "submitted": [8917, 8863],
    }));
    mock.insert_user(json!({"id": "BrandonM", "created": 1173923446, "karma": 1}));
    mock.insert("topstories", json!([8863]));
    mock.insert("maxitem", json!(9224));
}
