//! Raw upstream payloads, decoded permissively
//!
//! The catalog API omits fields, sends `null`, and occasionally changes a
//! field's type. Every field here is optional: anything absent or of an
//! unexpected shape decodes to `None` (or an empty list) instead of failing
//! the whole record.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One page of the upstream movie listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamPage {
    /// Raw movie records; non-object entries are dropped
    #[serde(default, deserialize_with = "lenient_list")]
    pub docs: Vec<UpstreamMovieRecord>,
    /// Current page number
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u64>,
    /// Total page count
    #[serde(default, deserialize_with = "lenient")]
    pub pages: Option<u64>,
    /// Page size
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<u64>,
    /// Matching records across all pages
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<u64>,
}

impl UpstreamPage {
    /// Decode a page from a JSON object
    ///
    /// Returns `None` when the value is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

/// Identifier that the upstream sends either as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UpstreamId {
    /// Numeric catalog id
    Number(u64),
    /// Opaque string id
    Text(String),
}

impl UpstreamId {
    /// Identifier as sent to callers, `None` for an empty string
    #[must_use]
    pub fn to_non_empty_string(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for UpstreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Raw movie record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamMovieRecord {
    /// Catalog identifier
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<UpstreamId>,
    /// Storage identifier some upstream versions send instead of `id`
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub object_id: Option<UpstreamId>,
    /// Localized title
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Original or alternative title
    #[serde(default, deserialize_with = "lenient")]
    pub alternative_name: Option<String>,
    /// Type classification: `movie`, `tv-series`, `cartoon`, ...
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Poster links
    #[serde(default, deserialize_with = "lenient_object")]
    pub poster: Option<UpstreamPoster>,
    /// Scores by source
    #[serde(default, deserialize_with = "lenient_object")]
    pub rating: Option<UpstreamRating>,
    /// One-line synopsis
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<String>,
    /// Full synopsis
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    /// Release year
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i32>,
    /// Genre entries; non-object entries are dropped
    #[serde(default, deserialize_with = "lenient_list")]
    pub genres: Vec<UpstreamGenre>,
    /// Identifiers on other sites
    #[serde(default, deserialize_with = "lenient_object")]
    pub external_id: Option<UpstreamExternalId>,
}

impl UpstreamMovieRecord {
    /// Decode a record from a JSON object
    ///
    /// Returns `None` when the value is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

/// Poster links
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamPoster {
    /// Full-size image
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Smaller preview image
    #[serde(default, deserialize_with = "lenient")]
    pub preview_url: Option<String>,
}

/// Ratings block; every score is independently optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRating {
    /// Kinopoisk aggregate score
    #[serde(default, deserialize_with = "lenient")]
    pub kp: Option<f64>,
    /// IMDb audience score
    #[serde(default, deserialize_with = "lenient")]
    pub imdb: Option<f64>,
    /// Professional critics score
    #[serde(default, deserialize_with = "lenient")]
    pub film_critics: Option<f64>,
    /// Anticipation score for unreleased titles
    #[serde(rename = "await", default, deserialize_with = "lenient")]
    pub anticipation: Option<f64>,
}

/// Genre entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamGenre {
    /// Localized genre name
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Identifiers on other sites
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamExternalId {
    /// Identifier on the HD streaming site
    #[serde(rename = "kpHD", default, deserialize_with = "lenient")]
    pub kp_hd: Option<String>,
    /// IMDb title id
    #[serde(default, deserialize_with = "lenient")]
    pub imdb: Option<String>,
}

/// Decode any scalar, mapping type mismatches and `null` to `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Like [`lenient`], but only accepts JSON objects
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}

/// Decode a list of objects, dropping entries that are not objects
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| T::deserialize(item).ok())
        .collect())
}
