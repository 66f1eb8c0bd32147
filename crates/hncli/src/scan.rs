//! Walks a range of item ids and records every id that cannot be fetched or decoded.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hnapi_service::caching::NoopCache;
use hnapi_service::config::Config;
use hnapi_service::download::{DataSource, HttpDataSource};
use hnapi_service::utils::http::create_client;
use hnapi_sources::ItemId;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// The first item id to fetch.
    #[arg(long, default_value_t = 1)]
    start: ItemId,

    /// The last item id to fetch. Defaults to the current maximum item id.
    #[arg(long)]
    end: Option<ItemId>,

    /// The file the failing ids are written to, one per line.
    #[arg(long, short, default_value = "failed-items.txt")]
    output: PathBuf,
}

/// The outcome of a scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// The number of ids that were requested.
    pub scanned: u64,
    /// The number of ids that failed.
    pub failed: u64,
}

/// Scans items over HTTP, bypassing any cache.
pub async fn run(config: &Config, args: ScanArgs) -> Result<()> {
    let client = create_client(&config.timeouts, &config.user_agent)
        .context("failed to create the HTTP client")?;
    let source = HttpDataSource::new(
        client,
        config.timeouts,
        config.base_url.clone(),
        Arc::new(NoopCache),
    );

    let end = match args.end {
        Some(end) => end,
        None => source
            .fetch_max_item()
            .await
            .context("failed to fetch the maximum item id")?,
    };

    let summary = scan(&source, args.start, end, &args.output).await?;
    println!(
        "scanned {} items, {} failed (see {})",
        summary.scanned,
        summary.failed,
        args.output.display()
    );
    Ok(())
}

/// Fetches every id in `start..=end` in order and appends the failing ids to `output`.
///
/// The output file is truncated before the scan starts.
pub async fn scan(
    source: &dyn DataSource,
    start: ItemId,
    end: ItemId,
    output: &Path,
) -> Result<ScanSummary> {
    let mut file = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut summary = ScanSummary::default();

    for id in start..=end {
        summary.scanned += 1;
        match source.fetch_item(id).await {
            Ok(_) => tracing::trace!(id, "Fetched item"),
            Err(error) => {
                tracing::warn!(id, error = %error, "Failed to fetch item");
                summary.failed += 1;
                file.write_all(format!("{id}\n").as_bytes()).await?;
                file.flush().await?;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use hnapi_service::test::MockSource;
    use serde_json::json;

    use super::*;

    fn story(id: ItemId) -> serde_json::Value {
        json!({"id": id, "type": "story", "by": "pg", "time": 1160418111, "title": "Story"})
    }

    #[tokio::test]
    async fn test_scan_records_failures() {
        hnapi_service::test::setup();
        let source = MockSource::new();
        source.insert_item(story(1));
        source.insert_item(json!({"id": 2, "type": "story", "time": "yesterday"}));
        source.insert_item(story(4));

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("failed.txt");
        std::fs::write(&output, "stale\n").unwrap();

        let summary = scan(&source, 1, 4, &output).await.unwrap();
        assert_eq!(
            summary,
            ScanSummary {
                scanned: 4,
                failed: 2
            }
        );
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "2\n3\n");
        assert_eq!(source.requests(), 4);
    }

    #[tokio::test]
    async fn test_scan_empty_range() {
        let source = MockSource::new();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("failed.txt");

        let summary = scan(&source, 5, 4, &output).await.unwrap();
        assert_eq!(summary, ScanSummary::default());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }
}
