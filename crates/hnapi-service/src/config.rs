use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, de};
use tracing::level_filters::LevelFilter;

use hnapi_sources::BaseUrl;

use crate::error::Error;
use crate::lazy::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE, ListSettings};
use crate::utils::http::{Timeouts, USER_AGENT};

/// The default time a fetched record stays in the in-memory cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2);

/// The format of log output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `pretty` when `stderr` is a terminal, `simplified` otherwise.
    Auto,
    /// Multi-line, colored output.
    Pretty,
    /// One line per event without colors.
    Simplified,
    /// One JSON object per event.
    Json,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// The most verbose level that is logged, unless `RUST_LOG` is set.
    #[serde(deserialize_with = "deserialize_level_filter")]
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Reporting of request and cache metrics.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// `host:port` of the statsd server. Defaults to `$STATSD_SERVER`, and metrics are
    /// disabled if neither is set.
    pub statsd: Option<String>,
    /// Prepended to the name of every metric.
    pub prefix: String,
    /// Tags sent with every metric.
    pub custom_tags: BTreeMap<String, String>,
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics {
            statsd: env::var("STATSD_SERVER").ok(),
            prefix: "hnapi".into(),
            custom_tags: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The root of the remote API, without a trailing slash.
    pub base_url: BaseUrl,

    /// How long a fetched record is served from the in-memory cache.
    ///
    /// A value of `0s` disables caching.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// The number of elements per page of every list.
    pub page_size: usize,

    /// The number of records fetched concurrently when resolving a page.
    pub max_concurrency: usize,

    /// Timeouts of the HTTP client.
    pub timeouts: Timeouts,

    /// The `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Configuration for internal logging.
    pub logging: Logging,

    /// Configuration for reporting metrics to a statsd instance.
    pub metrics: Metrics,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: BaseUrl::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeouts: Timeouts::default(),
            user_agent: USER_AGENT.into(),
            logging: Logging::default(),
            metrics: Metrics::default(),
        }
    }
}

impl Config {
    /// Loads the configuration file at `path`, or the defaults if there is none.
    pub fn get(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open configuration file {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Parses and validates a YAML configuration. Omitted fields take their defaults.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut yaml = String::new();
        reader
            .read_to_string(&mut yaml)
            .context("failed reading config file")?;
        if yaml.trim().is_empty() {
            anyhow::bail!("config file empty");
        }

        let config: Self = serde_yaml::from_str(&yaml).context("failed to parse config YAML")?;
        config.list_settings().context("invalid list settings")?;
        Ok(config)
    }

    /// The settings of the first page of every list.
    pub fn list_settings(&self) -> Result<ListSettings, Error> {
        ListSettings::new(1, self.page_size, self.max_concurrency)
    }
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let level = String::deserialize(deserializer)?;
    match level.as_str() {
        "off" | "error" | "warn" | "info" | "debug" | "trace" => {
            level.parse().map_err(de::Error::custom)
        }
        _ => Err(de::Error::unknown_variant(
            &level,
            &["off", "error", "warn", "info", "debug", "trace"],
        )),
    }
}
