//! A local stand-in of the remote API for tests.
//!
//! Call [`setup`] at the start of every test to capture logs, and hold on to the [`MockApi`]
//! until the last request to it was made: dropping it stops the server.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing_subscriber::filter::EnvFilter;

/// Captures the logs of the `hnapi` crates in the test output. Other crates stay silent.
pub fn setup() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("hnapi_service=trace,hncli=trace"))
        .with_target(false)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Serves `router` on an ephemeral port of localhost, returning the address and the task.
///
/// Must be called within a `tokio` runtime.
fn serve(router: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let listener = tokio::net::TcpListener::from_std(listener).unwrap();

    let task = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, task)
}

type Records = Arc<Mutex<BTreeMap<String, Value>>>;

/// An in-process stand-in of the remote JSON API that counts the hits on every path.
///
/// Records are served under `/v0/{path}.json`. Like the real remote, paths without a record
/// respond with a JSON `null`. A few additional routes inject failures:
///
///  - `/delay/{duration}/{path}` waits for `duration` (like `100ms`) and redirects to `/{path}`.
///  - `/respond_statuscode/{status}/{path}` responds with an empty body and the given status.
///  - `/garbage_data/{path}` responds with a body that is not JSON.
///
/// Use [`base_url`](Self::base_url) and friends to point a client at these routes.
pub struct MockApi {
    addr: SocketAddr,
    task: JoinHandle<()>,
    records: Records,
    hits: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl MockApi {
    pub fn new() -> Self {
        let records: Records = Default::default();
        let hits = Arc::new(Mutex::new(BTreeMap::new()));

        let hitcounter = {
            let hits = hits.clone();
            move |extract::OriginalUri(uri): extract::OriginalUri,
                  req: extract::Request,
                  next: middleware::Next| {
                let hits = hits.clone();
                async move {
                    {
                        let mut hits = hits.lock().unwrap();
                        let hits = hits.entry(uri.path().to_string()).or_default();
                        *hits += 1;
                    }

                    next.run(req).await
                }
            }
        };

        let router = Router::new()
            .route(
                "/v0/*path",
                get({
                    let records = records.clone();
                    move |extract::Path(path): extract::Path<String>| async move {
                        let key = path.strip_suffix(".json").unwrap_or(&path);
                        let record = records.lock().unwrap().get(key).cloned();
                        Json(record.unwrap_or(Value::Null))
                    }
                }),
            )
            .route(
                "/delay/:time/*path",
                get(
                    |extract::Path((time, path)): extract::Path<(String, String)>| async move {
                        let duration = humantime::parse_duration(&time).unwrap();
                        tokio::time::sleep(duration).await;

                        (StatusCode::FOUND, [("Location", format!("/{}", path))])
                    },
                ),
            )
            .route(
                "/respond_statuscode/:num/*tail",
                get(
                    |extract::Path((num, _)): extract::Path<(u16, String)>| async move {
                        StatusCode::from_u16(num).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                    },
                ),
            )
            .route(
                "/garbage_data/*tail",
                get(|extract::Path(tail): extract::Path<String>| async move { tail }),
            )
            .layer(middleware::from_fn(hitcounter));

        let (addr, task) = serve(router);

        Self {
            addr,
            task,
            records,
            hits,
        }
    }

    /// The base url serving the stored records.
    pub fn base_url(&self) -> String {
        self.route_url("v0")
    }

    /// A base url that serves the stored records after waiting for `delay`, like `"1h"`.
    pub fn delayed_base_url(&self, delay: &str) -> String {
        self.route_url(&format!("delay/{delay}/v0"))
    }

    /// A base url responding to every request with `status`.
    pub fn failing_base_url(&self, status: u16) -> String {
        self.route_url(&format!("respond_statuscode/{status}"))
    }

    /// A base url responding to every request with a body that is not JSON.
    pub fn garbage_base_url(&self) -> String {
        self.route_url("garbage_data")
    }

    fn route_url(&self, path: &str) -> String {
        format!("http://localhost:{}/{path}", self.addr.port())
    }

    /// Serves `record` at `/v0/{path}.json`, for example at `item/1`.
    pub fn insert(&self, path: &str, record: Value) {
        self.records.lock().unwrap().insert(path.to_owned(), record);
    }

    /// Stores an item record under its `id` field.
    pub fn insert_item(&self, item: Value) {
        let id = item["id"].as_u64().unwrap();
        self.insert(&format!("item/{id}"), item);
    }

    /// Stores a user record under its `id` field.
    pub fn insert_user(&self, user: Value) {
        let id = user["id"].as_str().unwrap().to_owned();
        self.insert(&format!("user/{id}"), user);
    }

    /// Stops serving the record at `path`.
    pub fn remove(&self, path: &str) {
        self.records.lock().unwrap().remove(path);
    }

    /// The number of hits on `/v0/{path}.json`.
    pub fn hits(&self, path: &str) -> usize {
        let key = format!("/v0/{path}.json");
        self.hits.lock().unwrap().get(&key).copied().unwrap_or(0)
    }

    /// Returns and resets the total number of hits on all paths.
    pub fn accesses(&self) -> usize {
        let map = std::mem::take(&mut *self.hits.lock().unwrap());
        map.into_values().sum()
    }

    /// Returns and resets the hits per path.
    pub fn all_hits(&self) -> Vec<(String, usize)> {
        let map = std::mem::take(&mut *self.hits.lock().unwrap());
        map.into_iter().collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}
