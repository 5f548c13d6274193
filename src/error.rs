//! Domain errors raised by the fetchers, the database client and the job.

use std::fmt;

/// Typed failures surfaced by inner components.
///
/// These are boxed into `anyhow::Error` on the way up; the job boundary can
/// recover them with `downcast_ref::<JobError>()` for precise reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The remote answered with a non-success status.
    HttpStatus {
        url: String,
        status: u16,
        status_text: String,
    },
    /// The database service rejected the credentials.
    AuthenticationFailed(String),
    /// A response was well-formed but lacked the data the job needs.
    NoData(String),
    /// Pagination still advertised more pages after the configured cap.
    PageLimitExceeded { url: String, max_pages: u32 },
}

impl JobError {
    /// Short, stable name used as the exception type when reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::HttpStatus { .. } => "HttpStatusError",
            JobError::AuthenticationFailed(_) => "AuthenticationError",
            JobError::NoData(_) => "NoDataError",
            JobError::PageLimitExceeded { .. } => "PageLimitExceeded",
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::HttpStatus {
                url,
                status,
                status_text,
            } => {
                write!(
                    f,
                    "Failed to fetch data: {} (HTTP {} from {})",
                    status_text, status, url
                )
            }
            JobError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {}", msg)
            }
            JobError::NoData(msg) => write!(f, "No data: {}", msg),
            JobError::PageLimitExceeded { url, max_pages } => {
                write!(
                    f,
                    "Pagination of {} did not finish within {} pages",
                    url, max_pages
                )
            }
        }
    }
}

impl std::error::Error for JobError {}
