//! Typed operations over the catalog client
//!
//! | Module | Upstream | Description |
//! |--------|----------|-------------|
//! | `movies` | `GET /v1.4/movie` | Genre listing with rating filter and paging |

pub mod movies;

pub use movies::{MoviesApi, PagedResult};
