use hnapi_service::config::{Config, LogFormat};
use hnapi_service::logging::json_layer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

/// The filter directives used when `RUST_LOG` is not set.
///
/// HTTP client internals stay at `WARN` unless tracing is requested.
fn default_directives(level: LevelFilter) -> String {
    match level {
        LevelFilter::OFF => "off".to_owned(),
        LevelFilter::TRACE => "info,hnapi_service=trace,hncli=trace".to_owned(),
        level => format!("{level},hyper=warn,reqwest=warn,hnapi_service={level},hncli={level}"),
    }
}

/// Installs the global subscriber of the command line client.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to `stderr`, so they never
/// mix with the printed results.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.logging.level)));

    let fmt = tracing_subscriber::fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr);

    let layer = match config.logging.format {
        LogFormat::Json => json_layer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt.pretty().boxed(),
        LogFormat::Simplified => fmt.compact().with_ansi(false).boxed(),
        LogFormat::Auto if console::user_attended_stderr() => fmt.pretty().boxed(),
        LogFormat::Auto => fmt.compact().with_ansi(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

/// Logs an error to the configured logger or `stderr` if not yet configured.
pub fn ensure_log_error(error: &anyhow::Error) {
    if tracing::Level::ERROR <= tracing::level_filters::STATIC_MAX_LEVEL
        && tracing::Level::ERROR <= LevelFilter::current()
    {
        tracing::error!("{:?}", error);
    } else {
        eprintln!("{error:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(LevelFilter::OFF), "off");
        assert_eq!(
            default_directives(LevelFilter::WARN),
            "warn,hyper=warn,reqwest=warn,hnapi_service=warn,hncli=warn"
        );
        assert!(default_directives(LevelFilter::TRACE).contains("hncli=trace"));

        for level in [LevelFilter::ERROR, LevelFilter::INFO, LevelFilter::DEBUG] {
            let filter = EnvFilter::try_new(default_directives(level));
            assert!(filter.is_ok(), "{level}");
        }
    }
}
