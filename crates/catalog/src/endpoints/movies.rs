//! Movie listing
//!
//! Composes the pipeline: translate the caller query, fetch with retries,
//! classify the outcome, normalize each record.

use crate::classify::classify;
use crate::client::CatalogClient;
use crate::error::CatalogResult;
use crate::normalize::{normalize, NormalizedMovie};
use crate::query::{translate, MovieQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Movie listing interface
#[derive(Clone, Debug)]
pub struct MoviesApi {
    client: CatalogClient,
}

impl MoviesApi {
    /// Create a new movies API interface
    pub(crate) fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// List one page of movies for a genre
    ///
    /// The query is expected to have passed [`MovieQuery::validate`].
    #[instrument(skip(self), fields(genre = %query.genre, page = query.page))]
    pub async fn list(&self, query: &MovieQuery) -> CatalogResult<PagedResult> {
        let params = translate(query);
        let response = self.client.fetch(&params).await?;
        let page = classify(&response)?;

        let items: Vec<NormalizedMovie> = page.docs.iter().map(normalize).collect();
        debug!(
            status = response.status,
            attempts = response.attempts,
            items = items.len(),
            "Movie page normalized"
        );

        Ok(PagedResult {
            page: page.page.unwrap_or(u64::from(query.page)),
            pages: page.pages.unwrap_or(1),
            limit: page.limit.unwrap_or(u64::from(query.limit)),
            total: page.total.unwrap_or(items.len() as u64),
            items,
            source_status: response.status,
            source_time_ms: u64::try_from(response.elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// One page of normalized movies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult {
    /// Page number as reported upstream
    pub page: u64,
    /// Total number of pages
    pub pages: u64,
    /// Page size
    pub limit: u64,
    /// Total number of matching movies
    pub total: u64,
    /// Movies in upstream order
    pub items: Vec<NormalizedMovie>,
    /// Upstream HTTP status
    pub source_status: u16,
    /// Upstream wall-clock time, retries included
    pub source_time_ms: u64,
}
