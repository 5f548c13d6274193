use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::http::HttpClient;

pub const DEFAULT_PRODUCTS_URL: &str = "https://api.gumroad.com/v2/products";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: Option<String>,
    pub sales_count: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProductList {
    pub products: Vec<Product>,
}

impl ProductList {
    /// Sales of the first listed product.
    pub fn first_sales_count(&self) -> Result<u64, JobError> {
        self.products
            .first()
            .map(|product| product.sales_count)
            .ok_or_else(|| JobError::NoData("storefront returned no products".to_string()))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Latest supporter sales snapshot.
    async fn fetch_sales_count(&self) -> Result<u64>;
}

pub struct Gumroad {
    http: HttpClient,
    products_url: String,
    token: String,
}

impl Gumroad {
    #[tracing::instrument(skip(http, token))]
    pub fn new(http: HttpClient, products_url: &str, token: &str) -> Self {
        Self {
            http,
            products_url: products_url.to_string(),
            token: token.to_string(),
        }
    }

    pub async fn fetch_products(&self) -> Result<ProductList> {
        let request = self
            .http
            .inner()
            .get(&self.products_url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token);

        self.http.send_json(request).await
    }
}

#[async_trait]
impl SalesSource for Gumroad {
    #[tracing::instrument(skip(self))]
    async fn fetch_sales_count(&self) -> Result<u64> {
        let products = self.fetch_products().await?;
        debug!("Storefront listed {} product(s)", products.products.len());
        Ok(products.first_sales_count()?)
    }
}
