use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::time::Instant;

use crate::errors::ApiError;
use crate::services::metric_service;
use crate::state::store::KeyStore;

/// Build all metric routes under /metric
pub fn routes(store: KeyStore<String>) -> Router {
    Router::new()
        .route("/:key", get(get_summary).post(post_metric))
        .route("/:key/sum", get(get_sum))
        .with_state(store)
}

//
// ─────────────────────────────────────────────────────────────
// POST /metric/{key}
// Record one observation, e.g. { "value": 4 }
// ─────────────────────────────────────────────────────────────
//
async fn post_metric(
    Path(key): Path<String>,
    State(store): State<KeyStore<String>>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
{
    let observed_at = Instant::now();

    metric_service::record(&store, key, &body, observed_at)?;
    Ok(StatusCode::OK)
}

//
// ─────────────────────────────────────────────────────────────
// GET /metric/{key}
// Live count per value, or 404
// ─────────────────────────────────────────────────────────────
//
async fn get_summary(
    Path(key): Path<String>,
    State(store): State<KeyStore<String>>,
) -> Result<Json<BTreeMap<i64, u64>>, ApiError>
{
    Ok(Json(metric_service::summary(&store, &key)?))
}

//
// ─────────────────────────────────────────────────────────────
// GET /metric/{key}/sum
// Sum of live values, or 404
// ─────────────────────────────────────────────────────────────
//
async fn get_sum(
    Path(key): Path<String>,
    State(store): State<KeyStore<String>>,
) -> Result<Json<i64>, ApiError>
{
    Ok(Json(metric_service::sum(&store, &key)?))
}
