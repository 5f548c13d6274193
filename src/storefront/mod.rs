//! Storefront sales lookup.

mod gumroad;

#[cfg(test)]
pub use gumroad::MockSalesSource;
pub use gumroad::{DEFAULT_PRODUCTS_URL, Gumroad, Product, ProductList, SalesSource};
