//! Mapping of raw upstream records into the minimal client-facing shape
//!
//! Every rule is independent and total: a record missing any or all fields
//! still produces a [`NormalizedMovie`].

use crate::upstream::{UpstreamMovieRecord, UpstreamRating};
use serde::{Deserialize, Serialize};

/// Name used when a record carries neither a name nor an alternative name
pub const UNTITLED: &str = "Без названия";

/// Canonical catalog site for constructed links
pub const CATALOG_SITE: &str = "https://www.kinopoisk.ru";

/// Streaming site used when only the HD external id is known
pub const HD_SITE: &str = "https://hd.kinopoisk.ru";

/// Upstream types whose catalog pages live under `/series/`
pub const SERIES_TYPES: &[&str] = &["tv-series", "animated-series", "mini-series"];

/// Rating sources, most preferred first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSource {
    /// Kinopoisk aggregate score
    Kinopoisk,
    /// IMDb audience score
    Imdb,
    /// Professional critics score
    FilmCritics,
    /// Anticipation score; kept as the last fallback
    Anticipation,
}

/// Order in which rating sources are consulted
pub const RATING_PRIORITY: [RatingSource; 4] = [
    RatingSource::Kinopoisk,
    RatingSource::Imdb,
    RatingSource::FilmCritics,
    RatingSource::Anticipation,
];

impl RatingSource {
    fn read(self, rating: &UpstreamRating) -> Option<f64> {
        match self {
            Self::Kinopoisk => rating.kp,
            Self::Imdb => rating.imdb,
            Self::FilmCritics => rating.film_critics,
            Self::Anticipation => rating.anticipation,
        }
    }
}

/// Movie as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMovie {
    /// Upstream identifier rendered as a string
    pub id: Option<String>,
    /// Display title, never empty
    pub name: String,
    /// Poster URL
    pub poster: Option<String>,
    /// Rating in [0, 10] with one decimal digit
    pub rating: Option<f64>,
    /// Short description, else the full one
    pub description: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Genre names in upstream order
    pub genres: Vec<String>,
    /// Catalog page for the title
    pub url: Option<String>,
}

/// Normalize one upstream record
#[must_use]
pub fn normalize(record: &UpstreamMovieRecord) -> NormalizedMovie {
    NormalizedMovie {
        id: record
            .id
            .as_ref()
            .and_then(|id| id.to_non_empty_string())
            .or_else(|| {
                record
                    .object_id
                    .as_ref()
                    .and_then(|id| id.to_non_empty_string())
            }),
        name: first_text([&record.name, &record.alternative_name])
            .unwrap_or_else(|| UNTITLED.to_string()),
        poster: record
            .poster
            .as_ref()
            .and_then(|poster| non_empty(poster.url.as_ref())),
        rating: record.rating.as_ref().and_then(pick_rating),
        description: first_text([&record.short_description, &record.description]),
        year: record.year,
        genres: record
            .genres
            .iter()
            .filter_map(|genre| non_empty(genre.name.as_ref()))
            .collect(),
        url: catalog_url(record),
    }
}

/// First usable score in priority order, rounded to one decimal
///
/// Scores outside [0, 10] are treated as missing.
#[must_use]
pub fn pick_rating(rating: &UpstreamRating) -> Option<f64> {
    RATING_PRIORITY
        .iter()
        .filter_map(|source| source.read(rating))
        .find(|value| value.is_finite() && (0.0..=10.0).contains(value))
        .map(round_rating)
}

/// Round to one decimal place, halves away from zero
#[must_use]
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Link to the record's catalog page
///
/// Prefers the catalog id; falls back to the HD external id.
#[must_use]
pub fn catalog_url(record: &UpstreamMovieRecord) -> Option<String> {
    if let Some(id) = record.id.as_ref().and_then(|id| id.to_non_empty_string()) {
        let segment = match record.kind.as_deref() {
            Some(kind) if SERIES_TYPES.contains(&kind) => "series",
            _ => "film",
        };
        return Some(format!("{CATALOG_SITE}/{segment}/{id}/"));
    }

    record
        .external_id
        .as_ref()
        .and_then(|external| non_empty(external.kp_hd.as_ref()))
        .map(|kp_hd| format!("{HD_SITE}/film/{kp_hd}"))
}

fn first_text<const N: usize>(candidates: [&Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .find_map(|candidate| non_empty(candidate.as_ref()))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}
