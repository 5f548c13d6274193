//! Configuration for one run, assembled from the command line and environment.

use std::fmt;

use crate::aggregate::AssetSelector;
use crate::database::CollectionTarget;

/// Where the counters come from.
#[derive(Clone)]
pub struct SourceConfig {
    pub releases_url: String,
    pub github_token: String,
    pub products_url: String,
    pub storefront_token: String,
    pub max_pages: u32,
    pub selector: AssetSelector,
}

/// Where the summary is written.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub app_services_url: String,
    pub app_id: String,
    pub api_key: String,
    pub target: CollectionTarget,
}

/// Everything the scheduled job needs. Lives for exactly one run.
#[derive(Clone, Debug)]
pub struct Config {
    pub sources: SourceConfig,
    pub database: DatabaseConfig,
    pub sentry_dsn: String,
}

/// Keeps just enough of a credential to tell two apart in logs.
pub fn mask(secret: &str) -> String {
    if secret.len() <= 12 {
        return "*********".to_string();
    }
    match (secret.get(..4), secret.get(secret.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{}*********{}", head, tail),
        _ => "*********".to_string(),
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("releases_url", &self.releases_url)
            .field("github_token", &mask(&self.github_token))
            .field("products_url", &self.products_url)
            .field("storefront_token", &mask(&self.storefront_token))
            .field("max_pages", &self.max_pages)
            .field("selector", &self.selector)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("app_services_url", &self.app_services_url)
            .field("app_id", &self.app_id)
            .field("api_key", &mask(&self.api_key))
            .field("target", &self.target)
            .finish()
    }
}
