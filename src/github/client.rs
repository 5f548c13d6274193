use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use serde::de::DeserializeOwned;

use super::link::has_last_relation;
use super::types::Release;
use crate::error::JobError;
use crate::http::{self, HttpClient};

pub const DEFAULT_RELEASES_URL: &str =
    "https://api.github.com/repos/Droptop-Four/Droptop-Four/releases";

/// Versioned media type requested from the REST API.
pub const MEDIA_TYPE: &str = "application/vnd.github+json";

pub const API_VERSION: &str = "2022-11-28";

/// Upper bound on pages fetched from a single collection.
pub const DEFAULT_MAX_PAGES: u32 = 100;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Every release across all pages, in page order.
    async fn fetch_releases(&self) -> Result<Vec<Release>>;
}

pub struct GitHub {
    http: HttpClient,
    releases_url: String,
    token: String,
    max_pages: u32,
}

impl GitHub {
    #[tracing::instrument(skip(http, token))]
    pub fn new(http: HttpClient, releases_url: &str, token: &str) -> Self {
        Self {
            http,
            releases_url: releases_url.to_string(),
            token: token.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn page_request(&self, url: &str, page: u32) -> RequestBuilder {
        self.http
            .inner()
            .get(url)
            .query(&[("page", page.to_string())])
            .header(ACCEPT, MEDIA_TYPE)
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, http::USER_AGENT)
    }

    /// Fetches every page of a JSON array resource.
    ///
    /// Pages are requested as `?page=1`, `?page=2`, ... for as long as the
    /// previous response's `Link` header advertises a `last` relation. More
    /// than `max_pages` pages is an error rather than a silent truncation.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_all_pages<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            if page > self.max_pages {
                return Err(JobError::PageLimitExceeded {
                    url: url.to_string(),
                    max_pages: self.max_pages,
                }
                .into());
            }

            debug!("Fetching page {} from {}...", page, url);

            let response = self.http.send(self.page_request(url, page)).await?;

            let has_more = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .is_some_and(has_last_relation);

            let parsed: Vec<T> = http::read_json(response).await?;
            items.extend(parsed);

            if !has_more {
                break;
            }

            page += 1;
        }

        debug!("Fetched {} items over {} page(s)", items.len(), page);

        Ok(items)
    }
}

#[async_trait]
impl ReleaseSource for GitHub {
    #[tracing::instrument(skip(self))]
    async fn fetch_releases(&self) -> Result<Vec<Release>> {
        self.fetch_all_pages(&self.releases_url).await
    }
}
