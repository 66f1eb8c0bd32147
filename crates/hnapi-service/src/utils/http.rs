use std::time::Duration;

use serde::Deserialize;

/// The `User-Agent` sent with every request, unless configured otherwise.
pub const USER_AGENT: &str = concat!("hnapi/", env!("CARGO_PKG_VERSION"));

/// Timeouts of the HTTP client.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// The timeout for establishing a connection.
    #[serde(with = "humantime_serde")]
    pub connect: Duration,
    /// Global timeout for one request, including reading the body.
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(500),
            request: Duration::from_secs(30),
        }
    }
}

/// Creates a [`reqwest::Client`] with the provided options.
///
/// * `timeouts` controls connection and request timeouts.
/// * `user_agent` is sent with every request.
pub fn create_client(
    timeouts: &Timeouts,
    user_agent: &str,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .gzip(true)
        .user_agent(user_agent)
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
}
