//! HTTP surface over the catalog client

use crate::config::{AllowedOrigins, ServerConfig};
use anyhow::{Context, Result};
use axum::extract::{Query, Request, State};
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cinefeed_catalog::{CatalogClient, CatalogError, MovieQuery, PagedResult};
use cinefeed_core::validation::ValidationError;
use serde::Deserialize;
use serde_json::json;
use tower::util::{MapRequest, MapRequestLayer};
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogClient,
}

/// Router wrapped so that paths are normalized before routing
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Query string accepted by `GET /movies`
#[derive(Debug, Deserialize)]
pub struct MoviesParams {
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub min_rating: f64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl From<MoviesParams> for MovieQuery {
    fn from(params: MoviesParams) -> Self {
        MovieQuery::new(params.genre)
            .with_min_rating(params.min_rating)
            .with_page(params.page)
            .with_limit(params.limit)
    }
}

/// Handler failure rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<ValidationError>),
    Catalog(CatalogError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": errors }))).into_response()
            }
            Self::Catalog(err) => {
                let status =
                    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
                warn!(
                    status = status.as_u16(),
                    kind = ?err.kind(),
                    error = %err,
                    "Movie listing failed"
                );
                (status, Json(json!({ "detail": err.to_string() }))).into_response()
            }
        }
    }
}

/// Build the routes and layers
pub fn router(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/health", get(health))
        .route("/robots.txt", get(robots))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
}

/// Build the full application, including path normalization
pub fn app(state: AppState, origins: &AllowedOrigins) -> App {
    MapRequestLayer::new(collapse_slashes as fn(Request) -> Request).layer(router(state, origins))
}

/// Serve until Ctrl-C
pub async fn serve(config: ServerConfig, catalog: CatalogClient) -> Result<()> {
    let app = app(AppState { catalog }, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(addr = %config.bind, origins = ?config.allowed_origins, "Listening");

    axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => layer.allow_origin(
            list.iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>(),
        ),
    }
}

/// Collapse runs of `/` in the request path, keeping the query
fn collapse_slashes(mut request: Request) -> Request {
    let path = request.uri().path();
    if !path.contains("//") {
        return request;
    }

    let mut collapsed = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    if let Some(query) = request.uri().query() {
        collapsed.push('?');
        collapsed.push_str(query);
    }

    let mut parts = request.uri().clone().into_parts();
    if let Ok(path_and_query) = PathAndQuery::try_from(collapsed) {
        parts.path_and_query = Some(path_and_query);
        if let Ok(uri) = Uri::from_parts(parts) {
            *request.uri_mut() = uri;
        }
    }
    request
}

async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesParams>,
) -> Result<Json<PagedResult>, ApiError> {
    let query = MovieQuery::from(params);

    let validation = query.validate();
    if !validation.is_valid() {
        return Err(ApiError::Validation(validation.into_errors()));
    }

    let page = state.catalog.movies().list(&query).await?;
    Ok(Json(page))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn robots() -> &'static str {
    ROBOTS_TXT
}
