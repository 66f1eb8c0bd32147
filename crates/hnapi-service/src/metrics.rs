//! Statsd metrics.
//!
//! Metrics are dropped until [`configure_statsd`] installs a global [`Reporter`]. Emit them
//! with the [`metric!`](crate::metric) macro:
//!
//! ```ignore
//! metric!(counter("requests") += 1, "endpoint" => "item");
//! metric!(timer("requests.duration") = start.elapsed(), "endpoint" => "item");
//! ```
use std::collections::BTreeMap;
use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use cadence::{Metric, MetricBuilder, StatsdClient, UdpMetricSink};

static REPORTER: OnceLock<Reporter> = OnceLock::new();

#[doc(hidden)]
pub mod prelude {
    pub use cadence::prelude::*;
}

/// A statsd client that attaches a fixed set of tags to every metric it sends.
#[derive(Debug)]
pub struct Reporter {
    client: StatsdClient,
    tags: BTreeMap<String, String>,
}

impl Reporter {
    pub fn new(client: StatsdClient, tags: BTreeMap<String, String>) -> Self {
        Self { client, tags }
    }

    /// The client used to build metrics.
    pub fn client(&self) -> &StatsdClient {
        &self.client
    }

    /// Adds the global tags to `metric` and sends it.
    pub fn send<'a, T>(&'a self, mut metric: MetricBuilder<'a, '_, T>)
    where
        T: Metric + From<String>,
    {
        for (tag, value) in &self.tags {
            metric = metric.with_tag(tag, value);
        }
        metric.send()
    }
}

/// Reports all metrics to the statsd server at `host`, prefixing them with `prefix`.
///
/// Only the first successful call takes effect.
pub fn configure_statsd<A: ToSocketAddrs>(
    prefix: &str,
    host: A,
    tags: BTreeMap<String, String>,
) -> Result<()> {
    let addrs: Vec<_> = host
        .to_socket_addrs()
        .context("failed to resolve statsd host")?
        .collect();
    let addr = addrs.first().context("statsd host resolved to no address")?;
    tracing::info!(%addr, prefix, "Reporting metrics to statsd");

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_nonblocking(true)?;
    let sink = UdpMetricSink::from(&addrs[..], socket)?;

    if REPORTER
        .set(Reporter::new(StatsdClient::from_sink(prefix, sink), tags))
        .is_err()
    {
        tracing::debug!("Metrics are already configured");
    }
    Ok(())
}

/// Calls `f` with the global [`Reporter`], or returns the default if none is configured.
#[doc(hidden)]
#[inline(always)]
pub fn with_reporter<F, R>(f: F) -> R
where
    F: FnOnce(&Reporter) -> R,
    R: Default,
{
    REPORTER.get().map(f).unwrap_or_default()
}

/// Emits a counter, timer or histogram, with optional `"tag" => value` pairs.
#[macro_export]
macro_rules! metric {
    (counter($id:expr) += $value:expr $(, $k:expr => $v:expr)* $(,)?) => {
        $crate::metric!(@send count_with_tags($id, $value) $(, $k => $v)*)
    };
    (timer($id:expr) = $value:expr $(, $k:expr => $v:expr)* $(,)?) => {
        $crate::metric!(@send time_with_tags($id, $value) $(, $k => $v)*)
    };
    (histogram($id:expr) = $value:expr $(, $k:expr => $v:expr)* $(,)?) => {
        $crate::metric!(@send histogram_with_tags($id, $value) $(, $k => $v)*)
    };
    (@send $method:ident($id:expr, $value:expr) $(, $k:expr => $v:expr)*) => {{
        #[allow(unused_imports)]
        use $crate::metrics::prelude::*;
        $crate::metrics::with_reporter(|reporter| {
            reporter.send(reporter.client().$method($id, $value)$(.with_tag($k, $v))*);
        })
    }};
}
