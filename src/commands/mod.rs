use anyhow::Result;
use log::debug;

use crate::{http::HttpClient, job::Job, summary::DownloadsSummary};

pub mod config;
mod services;
mod show;

pub use show::show;

pub use crate::job::JobOutcome;
use config::Config;
use services::{build_database, build_release_source, build_reporter, build_sales_source};

/// Version reported with errors.
pub const VERSION: &str = env!("DOWNLOADS_SYNC_VERSION");

/// Run the scheduled job once.
///
/// Only configuration problems (an unusable DSN, a client that cannot be
/// built) are returned as errors. Anything that goes wrong during the run is
/// reported and logged, and comes back as [`JobOutcome::Failed`].
#[tracing::instrument(skip(config))]
pub async fn run(config: Config) -> Result<JobOutcome> {
    debug!("Running with {:?}", config);

    let http = HttpClient::build()?;
    let reporter = build_reporter(&http, &config.sentry_dsn, VERSION)?;

    let job = Job::new(
        build_release_source(&http, &config.sources),
        build_sales_source(&http, &config.sources),
        build_database(&http, &config.database),
        reporter,
        config.sources.selector,
    );

    Ok(job.run().await)
}

/// Render a summary for the terminal.
pub fn render_summary(summary: &DownloadsSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
