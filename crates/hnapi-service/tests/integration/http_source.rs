use std::sync::Arc;
use std::time::Duration;

use hnapi_service::FetchError;
use hnapi_service::caching::{Cache, NoopCache};
use hnapi_service::download::DataSource;
use hnapi_service::utils::http::Timeouts;
use hnapi_sources::{RawItem, StoryList};
use serde_json::json;

use crate::{MockApi, populate, setup_source, source_with_cache};

#[tokio::test]
async fn test_records_are_cached() {
    let mock = MockApi::new();
    populate(&mock);
    let (source, cache) = setup_source(&mock.base_url(), Duration::from_secs(60));

    for _ in 0..3 {
        let item = source.fetch_item(8863).await.unwrap();
        assert!(matches!(item, RawItem::Story(_)));
    }
    assert_eq!(mock.hits("item/8863"), 1);
    assert!(cache.get("item/8863").await.is_some());

    let user = source.fetch_user("dhouston").await.unwrap();
    assert_eq!(user.karma, 2937);
    source.fetch_user("dhouston").await.unwrap();
    assert_eq!(mock.hits("user/dhouston"), 1);

    assert_eq!(source.fetch_story_ids(StoryList::Top).await, Ok(vec![8863]));
    assert_eq!(source.fetch_max_item().await, Ok(9224));
    assert!(cache.get("topstories").await.is_some());
    assert!(cache.get("maxitem").await.is_some());
}

#[tokio::test]
async fn test_records_expire() {
    let mock = MockApi::new();
    populate(&mock);
    let (source, _cache) = setup_source(&mock.base_url(), Duration::from_millis(100));

    source.fetch_item(8863).await.unwrap();
    source.fetch_item(8863).await.unwrap();
    assert_eq!(mock.hits("item/8863"), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    source.fetch_item(8863).await.unwrap();
    assert_eq!(mock.hits("item/8863"), 2);
}

#[tokio::test]
async fn test_without_cache() {
    let mock = MockApi::new();
    populate(&mock);
    let source = source_with_cache(&mock.base_url(), Arc::new(NoopCache), Timeouts::default());

    source.fetch_item(8863).await.unwrap();
    source.fetch_item(8863).await.unwrap();
    assert_eq!(mock.hits("item/8863"), 2);
}

#[tokio::test]
async fn test_missing_records() {
    let mock = MockApi::new();
    let (source, cache) = setup_source(&mock.base_url(), Duration::from_secs(60));

    assert_eq!(source.fetch_item(1).await, Err(FetchError::NotFound));
    assert_eq!(
        source.fetch_user("nobody").await.map(|user| user.id),
        Err(FetchError::NotFound)
    );
    // failures are not cached
    assert!(cache.get("item/1").await.is_none());
    assert_eq!(source.fetch_item(1).await, Err(FetchError::NotFound));
    assert_eq!(mock.hits("item/1"), 2);
}

#[tokio::test]
async fn test_malformed_records_are_not_cached() {
    let mock = MockApi::new();
    mock.insert_item(json!({
        "id": 1, "type": "story", "by": "pg", "time": 1160418111, "score": -1,
    }));
    let (source, cache) = setup_source(&mock.base_url(), Duration::from_secs(60));

    assert!(matches!(
        source.fetch_item(1).await,
        Err(FetchError::Malformed(_))
    ));
    assert!(cache.get("item/1").await.is_none());

    mock.insert_item(json!({
        "id": 1, "type": "story", "by": "pg", "time": 1160418111, "score": 57,
    }));
    assert!(source.fetch_item(1).await.is_ok());
    assert_eq!(mock.hits("item/1"), 2);
}

#[tokio::test]
async fn test_status_codes() {
    let mock = MockApi::new();

    let (source, _cache) = setup_source(&mock.failing_base_url(500), Duration::from_secs(60));
    assert_eq!(
        source.fetch_item(1).await,
        Err(FetchError::DownloadError("500 Internal Server Error".into()))
    );

    let (source, _cache) = setup_source(&mock.failing_base_url(403), Duration::from_secs(60));
    assert_eq!(
        source.fetch_item(1).await,
        Err(FetchError::PermissionDenied("403 Forbidden".into()))
    );

    let (source, _cache) = setup_source(&mock.failing_base_url(404), Duration::from_secs(60));
    assert_eq!(source.fetch_max_item().await, Err(FetchError::NotFound));
}

#[tokio::test]
async fn test_garbage_data() {
    let mock = MockApi::new();
    let (source, _cache) = setup_source(&mock.garbage_base_url(), Duration::from_secs(60));

    assert!(matches!(
        source.fetch_story_ids(StoryList::New).await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_timeout() {
    let mock = MockApi::new();
    populate(&mock);
    let timeouts = Timeouts {
        request: Duration::from_millis(200),
        ..Default::default()
    };
    let source = source_with_cache(
        &mock.delayed_base_url("1h"),
        Arc::new(NoopCache),
        timeouts,
    );

    assert_eq!(
        source.fetch_item(8863).await,
        Err(FetchError::Timeout(Duration::from_millis(200)))
    );
}

#[tokio::test]
async fn test_updates_evict_changed_records() {
    let mock = MockApi::new();
    populate(&mock);
    let (source, cache) = setup_source(&mock.base_url(), Duration::from_secs(60));

    source.fetch_item(8863).await.unwrap();
    source.fetch_item(9224).await.unwrap();
    source.fetch_user("dhouston").await.unwrap();
    assert_eq!(mock.accesses(), 3);

    mock.insert("updates", json!({"items": [9224], "profiles": ["dhouston"]}));
    let updates = source.fetch_updates().await.unwrap();
    assert_eq!(updates.items, vec![9224]);
    assert_eq!(updates.profiles, vec!["dhouston".to_owned()]);

    assert!(cache.get("item/9224").await.is_none());
    assert!(cache.get("user/dhouston").await.is_none());
    assert!(cache.get("item/8863").await.is_some());

    source.fetch_item(8863).await.unwrap();
    source.fetch_item(9224).await.unwrap();
    source.fetch_user("dhouston").await.unwrap();
    let hits = mock.all_hits();
    assert_eq!(
        hits,
        vec![
            ("/v0/item/9224.json".to_owned(), 1),
            ("/v0/updates.json".to_owned(), 1),
            ("/v0/user/dhouston.json".to_owned(), 1),
        ]
    );

    // cached updates do not evict again
    source.fetch_item(9224).await.unwrap();
    source.fetch_updates().await.unwrap();
    source.fetch_item(9224).await.unwrap();
    assert_eq!(mock.accesses(), 0);
}
