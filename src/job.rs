//! The scheduled job - orchestrates one sync run.
//!
//! This action coordinates:
//! - Authenticating to the database and resolving the summary collection
//! - Fetching release and storefront counters concurrently
//! - Writing the combined summary with a single upsert
//!
//! [`Job::run`] is the only catch-all boundary. Everything below it returns
//! typed errors; the boundary reports them once and completes normally.

use anyhow::{Context, Result};
use log::{error, info};

use crate::aggregate::{AssetSelector, ReleaseTotals, aggregate_releases};
use crate::database::Database;
use crate::github::ReleaseSource;
use crate::report::ErrorReporter;
use crate::storefront::SalesSource;
use crate::summary::DownloadsSummary;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The summary was written.
    Completed(DownloadsSummary),
    /// The run failed and the error was reported.
    Failed(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}

/// Fetches both sources and combines them into a summary.
#[tracing::instrument(skip_all)]
pub async fn collect_summary(
    releases: &dyn ReleaseSource,
    sales: &dyn SalesSource,
    selector: &AssetSelector,
) -> Result<DownloadsSummary> {
    let release_totals = async {
        let list = releases
            .fetch_releases()
            .await
            .context("Failed to fetch releases")?;
        Ok::<ReleaseTotals, anyhow::Error>(aggregate_releases(&list, selector))
    };

    let supporter_downloads = async {
        sales
            .fetch_sales_count()
            .await
            .context("Failed to fetch supporter sales")
    };

    let (totals, supporter) = tokio::try_join!(release_totals, supporter_downloads)?;

    Ok(DownloadsSummary::new(totals, supporter))
}

pub struct Job<G, S, D, E> {
    releases: G,
    sales: S,
    database: D,
    reporter: E,
    selector: AssetSelector,
}

impl<G, S, D, E> Job<G, S, D, E>
where
    G: ReleaseSource,
    S: SalesSource,
    D: Database,
    E: ErrorReporter,
{
    pub fn new(releases: G, sales: S, database: D, reporter: E, selector: AssetSelector) -> Self {
        Self {
            releases,
            sales,
            database,
            reporter,
            selector,
        }
    }

    /// Runs the job to completion. Failures are reported, logged and returned
    /// as [`JobOutcome::Failed`]; this never returns an error.
    pub async fn run(&self) -> JobOutcome {
        match self.execute().await {
            Ok(summary) => {
                info!(
                    "Downloads updated successfully (basic: {}, update: {}, supporter: {})",
                    summary.basic_downloads, summary.update_downloads, summary.supporter_downloads
                );
                JobOutcome::Completed(summary)
            }
            Err(e) => {
                self.reporter.capture_exception(&e).await;
                error!("Error updating downloads: {:#}", e);
                JobOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    async fn execute(&self) -> Result<DownloadsSummary> {
        info!("Authenticating to the database...");
        let collection = self
            .database
            .connect()
            .await
            .context("Failed to connect to the database")?;

        info!("Fetching download counters...");
        let summary = collect_summary(&self.releases, &self.sales, &self.selector).await?;

        info!("Writing downloads summary...");
        collection
            .upsert_one(DownloadsSummary::filter(), summary.update_document())
            .await
            .context("Failed to write the downloads summary")?;

        Ok(summary)
    }
}
