//! Caller filters and their translation into upstream query parameters

use cinefeed_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fields requested from the upstream, joined into `selectFields`
pub const SELECT_FIELDS: &[&str] = &[
    "id",
    "name",
    "alternativeName",
    "type",
    "poster",
    "rating",
    "description",
    "shortDescription",
    "year",
    "genres",
    "externalId",
];

/// Upstream field used both for sorting and for the rating filter
pub const RATING_FIELD: &str = "rating.kp";

/// Upstream filter on the localized genre name
pub const GENRE_FIELD: &str = "genres.name";

/// Descending sort order in upstream notation
pub const SORT_DESCENDING: &str = "-1";

/// Highest rating on the upstream scale
pub const MAX_RATING: f64 = 10.0;

/// Largest page size a caller may request
pub const MAX_LIMIT: u32 = 50;

/// Caller-side filter for one movie listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieQuery {
    /// Localized genre name, e.g. "комедия"
    pub genre: String,
    /// Minimum rating in [0, 10]; 0 disables the filter
    pub min_rating: f64,
    /// 1-based page number
    pub page: u32,
    /// Page size in [1, 50]
    pub limit: u32,
}

impl MovieQuery {
    /// Create a query for a genre with default paging and no rating filter
    pub fn new(genre: impl Into<String>) -> Self {
        Self {
            genre: genre.into(),
            min_rating: 0.0,
            page: 1,
            limit: 20,
        }
    }

    /// Set the minimum rating
    #[must_use]
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Check caller-supplied bounds
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .required("genre", &self.genre)
            .range("min_rating", self.min_rating, 0.0, MAX_RATING)
            .min("page", self.page, 1)
            .range("limit", self.limit, 1, MAX_LIMIT)
            .validate()
    }
}

/// A single upstream query value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Numeric parameter (page, limit)
    Number(u32),
    /// Textual parameter
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Query parameters sent to the upstream, in deterministic key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UpstreamQueryParams(BTreeMap<&'static str, QueryValue>);

impl UpstreamQueryParams {
    fn set(&mut self, key: &'static str, value: impl Into<QueryValue>) {
        self.0.insert(key, value.into());
    }

    /// Look up a parameter
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// Whether a parameter is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Translate a validated caller query into upstream parameters
///
/// The rating filter is only sent for a positive minimum; omitting it keeps
/// the upstream's own ranking unrestricted.
#[must_use]
pub fn translate(query: &MovieQuery) -> UpstreamQueryParams {
    let mut params = UpstreamQueryParams::default();

    params.set("page", query.page);
    params.set("limit", query.limit);
    params.set(GENRE_FIELD, query.genre.as_str());
    params.set("selectFields", SELECT_FIELDS.join(","));
    params.set("sortField", RATING_FIELD);
    params.set("sortType", SORT_DESCENDING);

    if query.min_rating > 0.0 {
        params.set(RATING_FIELD, rating_range(query.min_rating));
    }

    params
}

/// Lower bound keeps at least one fractional digit: `7.0-10`, `7.5-10`
fn rating_range(min_rating: f64) -> String {
    format!("{min_rating:?}-10")
}
