//! Hosted document database access.
//!
//! The job only needs two things from the database: an authenticated handle
//! on one collection, and an update-or-insert of a single document on it.

mod app_services;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use app_services::{
    AppServices, Collection, CollectionTarget, DEFAULT_APP_SERVICES_URL, DEFAULT_DATA_SOURCE, User,
};

/// Reply to an update-or-insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Value>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    /// Authenticates and resolves the configured collection.
    async fn connect(&self) -> Result<Box<dyn SummaryCollection>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryCollection: Send + Sync {
    /// Updates the first document matching `filter`, inserting it when absent.
    async fn upsert_one(&self, filter: Value, update: Value) -> Result<UpdateResult>;
}
