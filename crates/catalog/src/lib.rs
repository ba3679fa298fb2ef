//! Resilient client for the kinopoisk.dev movie catalog
//!
//! This crate turns a caller's genre filter into one page of compact,
//! normalized movie records.
//!
//! # Features
//!
//! - **Environment-based configuration**: credential, endpoint and limits from environment variables
//! - **Retry with exponential backoff**: transport failures and 5xx responses are retried
//! - **Bounded connection pool**: one shared client with a cap on in-flight attempts
//! - **Error classification**: every failure maps to a caller-facing status
//! - **Permissive decoding**: missing or mistyped upstream fields never fail a record
//!
//! # Example
//!
//! ```rust,no_run
//! use cinefeed_catalog::{CatalogClient, MovieQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new()?;
//!
//!     let query = MovieQuery::new("комедия").with_min_rating(7.0).with_limit(5);
//!     let page = client.movies().list(&query).await?;
//!
//!     for movie in &page.items {
//!         println!("{} {:?}", movie.name, movie.rating);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod normalize;
pub mod query;
pub mod upstream;

pub use client::{CatalogClient, FetchError, UpstreamResponse};
pub use config::{CatalogConfig, PoolConfig};
pub use endpoints::{MoviesApi, PagedResult};
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use normalize::NormalizedMovie;
pub use query::MovieQuery;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classify::classify;
    pub use crate::client::{CatalogClient, FetchError, UpstreamResponse};
    pub use crate::config::{CatalogConfig, PoolConfig};
    pub use crate::endpoints::{MoviesApi, PagedResult};
    pub use crate::error::{CatalogError, CatalogResult, ErrorKind};
    pub use crate::normalize::{normalize, NormalizedMovie};
    pub use crate::query::{translate, MovieQuery, UpstreamQueryParams};
}
