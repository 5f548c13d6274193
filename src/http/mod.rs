//! HTTP client module with status checking and JSON decoding.

mod client;

pub use client::{HttpClient, USER_AGENT, check_status, read_json};
