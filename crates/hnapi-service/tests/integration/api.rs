use std::time::Duration;

use hnapi_service::types::Item;
use hnapi_service::{Error, FetchError};
use serde_json::json;

use crate::{MockApi, populate, setup_api};

fn ids(items: &[Item]) -> Vec<u64> {
    items.iter().map(Item::id).collect()
}

#[tokio::test]
async fn test_top_stories() {
    let mock = MockApi::new();
    populate(&mock);
    let api = setup_api(&mock, |_| {});

    let top = api.top_stories();
    assert_eq!(mock.accesses(), 0);

    let page = top.fetch().await.unwrap();
    assert_eq!(ids(&page.elements), vec![8863]);
    assert_eq!(page.total_pages, 1);

    let story = match &page.elements[0] {
        Item::Story(story) => story.clone(),
        other => panic!("expected a story, got {other:?}"),
    };
    assert_eq!(story.score, 111);
    assert_eq!(
        story.url.as_deref(),
        Some("http://www.getdropbox.com/u/2/screencast.html")
    );

    let kids = story.kids.fetch().await.unwrap();
    assert_eq!(ids(&kids.elements), vec![9224, 8917]);

    let author = kids.elements[0].by().unwrap().fetch().await.unwrap();
    assert_eq!(author.username, "BrandonM");
}

#[tokio::test]
async fn test_pages_share_the_cache() {
    let mock = MockApi::new();
    for id in 1..=25u64 {
        mock.insert_item(json!({
            "id": id, "type": "story", "by": "pg", "time": 1160418111, "title": format!("#{id}"),
        }));
    }
    mock.insert("newstories", json!((1..=25).rev().collect::<Vec<u64>>()));
    let api = setup_api(&mock, |config| {
        config.page_size = 10;
        config.max_concurrency = 4;
    });

    let new = api.new_stories();
    let first = new.fetch().await.unwrap();
    assert_eq!(ids(&first.elements), (16..=25).rev().collect::<Vec<_>>());
    assert_eq!(first.total_pages, 3);

    let last = new.set_page(3).unwrap().fetch().await.unwrap();
    assert_eq!(ids(&last.elements), (1..=5).rev().collect::<Vec<_>>());

    let titles = new.map(|item| item.title().map(str::to_owned)).fetch().await.unwrap();
    assert_eq!(titles.elements[0].as_deref(), Some("#25"));

    let item = new.get_item(24).fetch().await.unwrap();
    assert_eq!(item.id(), 1);
    assert_eq!(
        new.get_item(25).fetch().await.unwrap_err(),
        Error::OutOfRange(25)
    );

    // the id list and every record were fetched exactly once
    let hits = mock.all_hits();
    assert_eq!(hits.len(), 16);
    assert!(hits.iter().all(|(_, count)| *count == 1));
}

#[tokio::test]
async fn test_all_items() {
    let mock = MockApi::new();
    populate(&mock);
    let api = setup_api(&mock, |config| config.page_size = 1);

    let all = api.all_items();
    let page = all.fetch().await.unwrap();
    assert_eq!(ids(&page.elements), vec![9224]);
    assert_eq!(page.total_elements, 9224);
    assert_eq!(page.total_pages, 9224);

    let page = all.set_page(9224 - 8863 + 1).unwrap().fetch().await.unwrap();
    assert_eq!(ids(&page.elements), vec![8863]);

    // there is no record for id 9223
    let error = all.set_page(2).unwrap().fetch().await.unwrap_err();
    assert_eq!(error, Error::Fetch(FetchError::NotFound));

    let item = all.get_item(9224 - 8917).fetch().await.unwrap();
    assert_eq!(item.id(), 8917);
}

#[tokio::test]
async fn test_changed_items_are_refetched() {
    let mock = MockApi::new();
    populate(&mock);
    let api = setup_api(&mock, |config| config.cache_ttl = Duration::from_secs(60));

    let story = api.item(8863).story();
    assert_eq!(story.fetch().await.unwrap().score, 111);

    mock.insert_item(json!({
        "id": 8863, "type": "story", "by": "dhouston", "time": 1175714200, "score": 112,
    }));
    // still served from the cache
    assert_eq!(story.fetch().await.unwrap().score, 111);

    mock.insert("updates", json!({"items": [8863], "profiles": []}));
    let changed = api.changed_items().fetch().await.unwrap();
    assert_eq!(ids(&changed.elements), vec![8863]);
    assert_eq!(story.fetch().await.unwrap().score, 112);

    assert!(api.changed_users().fetch().await.unwrap().elements.is_empty());
}

#[tokio::test]
async fn test_upstream_failures_propagate() {
    let mock = MockApi::new();
    let api = setup_api(&mock, |config| {
        config.base_url = mock.failing_base_url(502).parse().unwrap();
    });

    assert_eq!(
        api.best_stories().fetch().await.unwrap_err(),
        Error::Fetch(FetchError::DownloadError("502 Bad Gateway".into()))
    );
    assert_eq!(
        api.user("pg").fetch().await.unwrap_err(),
        Error::Fetch(FetchError::DownloadError("502 Bad Gateway".into()))
    );
}

#[tokio::test]
async fn test_invalid_settings() {
    let mock = MockApi::new();
    let config = hnapi_service::config::Config {
        base_url: mock.base_url().parse().unwrap(),
        page_size: 0,
        ..Default::default()
    };
    assert!(hnapi_service::HnApi::from_config(&config).is_err());
}
