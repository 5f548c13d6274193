use serde::Serialize;
use serde_json::{Value, json};

use crate::aggregate::ReleaseTotals;

/// Key of the single summary document.
pub const SUMMARY_TITLE: &str = "downloads";

/// The combined counters written on every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadsSummary {
    pub basic_downloads: u64,
    pub update_downloads: u64,
    pub supporter_downloads: u64,
}

impl DownloadsSummary {
    pub fn new(totals: ReleaseTotals, supporter_downloads: u64) -> Self {
        Self {
            basic_downloads: totals.basic_downloads,
            update_downloads: totals.update_downloads,
            supporter_downloads,
        }
    }

    /// Matches the summary document.
    pub fn filter() -> Value {
        json!({ "title": SUMMARY_TITLE })
    }

    /// `$set` update replacing every counter.
    pub fn update_document(&self) -> Value {
        json!({
            "$set": {
                "basic_downloads": self.basic_downloads,
                "update_downloads": self.update_downloads,
                "supporter_downloads": self.supporter_downloads,
            }
        })
    }
}
