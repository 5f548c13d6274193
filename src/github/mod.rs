//! GitHub release listing with link-header pagination.

mod client;
mod link;
mod types;

#[cfg(test)]
pub use client::MockReleaseSource;
pub use client::{
    API_VERSION, DEFAULT_MAX_PAGES, DEFAULT_RELEASES_URL, GitHub, MEDIA_TYPE, ReleaseSource,
};
pub use link::has_last_relation;
pub use types::{Release, ReleaseAsset};
