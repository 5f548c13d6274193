use anyhow::Result;

use crate::{http::HttpClient, job::collect_summary, summary::DownloadsSummary};

use super::config::SourceConfig;
use super::render_summary;
use super::services::{build_release_source, build_sales_source};

/// Fetch and print the current counters without writing them anywhere.
#[tracing::instrument(skip(config))]
pub async fn show(config: SourceConfig) -> Result<DownloadsSummary> {
    let http = HttpClient::build()?;
    let releases = build_release_source(&http, &config);
    let sales = build_sales_source(&http, &config);

    let summary = collect_summary(&releases, &sales, &config.selector).await?;
    println!("{}", render_summary(&summary)?);

    Ok(summary)
}
