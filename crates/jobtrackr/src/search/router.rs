use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::catalog::{CachedCatalog, CatalogSource};
use super::ranker::{clamp_limit, rank};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    /// Kept raw so a blank or malformed value falls back to the default instead of a 400.
    #[serde(default)]
    pub limit: Option<String>,
}

fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
}

/// Router exposing the job-title search endpoint.
pub fn search_router<S>(catalog: Arc<CachedCatalog<S>>) -> Router
where
    S: CatalogSource + 'static,
{
    Router::new()
        .route("/api/v1/job-titles/search", get(search_handler::<S>))
        .with_state(catalog)
}

pub(crate) async fn search_handler<S>(
    State(catalog): State<Arc<CachedCatalog<S>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: CatalogSource + 'static,
{
    // A reload reads the CSV from disk while holding the cache lock.
    let loader = Arc::clone(&catalog);
    let titles = match tokio::task::spawn_blocking(move || loader.titles(Utc::now())).await {
        Ok(Ok(titles)) => titles,
        Ok(Err(err)) => {
            error!(error = %err, "job-title catalog unavailable");
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response();
        }
        Err(err) => {
            error!(error = %err, "job-title catalog lookup task failed");
            let payload = json!({ "error": "job-title catalog lookup failed" });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
    };

    let query = params.q.unwrap_or_default();
    let limit = clamp_limit(parse_limit(params.limit.as_deref()));
    let results = rank(&query, &titles, limit);

    (StatusCode::OK, axum::Json(results)).into_response()
}
