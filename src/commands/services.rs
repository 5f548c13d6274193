//! Service factory for building the job's dependencies from configuration.

use anyhow::Result;
use log::debug;

use crate::{
    database::AppServices,
    github::GitHub,
    http::HttpClient,
    report::{Dsn, SentryReporter},
    storefront::Gumroad,
};

use super::config::{DatabaseConfig, SourceConfig};

/// Build the release listing client
pub fn build_release_source(http: &HttpClient, config: &SourceConfig) -> GitHub {
    debug!("Release source: {}", config.releases_url);
    GitHub::new(http.clone(), &config.releases_url, &config.github_token)
        .with_max_pages(config.max_pages)
}

/// Build the storefront client
pub fn build_sales_source(http: &HttpClient, config: &SourceConfig) -> Gumroad {
    debug!("Sales source: {}", config.products_url);
    Gumroad::new(http.clone(), &config.products_url, &config.storefront_token)
}

/// Build the database client
pub fn build_database(http: &HttpClient, config: &DatabaseConfig) -> AppServices {
    debug!("Database: {:?}", config);
    AppServices::new(
        http.clone(),
        &config.app_services_url,
        &config.app_id,
        &config.api_key,
        config.target.clone(),
    )
}

/// Build the error reporter from a DSN
pub fn build_reporter(http: &HttpClient, dsn: &str, release: &str) -> Result<SentryReporter> {
    let dsn = Dsn::parse(dsn)?;
    debug!("Reporting errors to {}", dsn.store_url());
    Ok(SentryReporter::new(http.clone(), dsn, release))
}
