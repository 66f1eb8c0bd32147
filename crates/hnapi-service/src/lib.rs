//! Lazy, paginated access to the Hacker News dataset.
//!
//! The entry point is [`HnApi`], which hands out lazily fetched [`Element`](lazy::Element)s and
//! paginated [`List`](lazy::List)s of items and users. Nothing is fetched until one of them is
//! awaited. Records are fetched through a [`DataSource`](download::DataSource), which keeps
//! recently fetched records in a [`Cache`](caching::Cache).

#[macro_use]
pub mod metrics;

pub mod api;
pub mod caching;
pub mod config;
pub mod download;
pub mod error;
pub mod lazy;
pub mod logging;
pub mod types;
pub mod utils;


pub use api::{ApiSettings, HnApi};
pub use error::{Error, FetchError};
