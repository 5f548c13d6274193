pub mod aggregate;
pub mod commands;
pub mod database;
pub mod error;
pub mod github;
pub mod http;
pub mod job;
pub mod report;
pub mod storefront;
pub mod summary;
