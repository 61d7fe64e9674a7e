use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::routes::{metric_routes, system_routes};
use crate::state::store::KeyStore;

/// Build the complete Axum application:
/// - /metric   (record observations, read live counts and sums)
/// - /system   (alive + version)
///
/// `store` is the process-wide counting store; every route gets a clone.
pub fn build_app(store: KeyStore<String>, cfg: AppConfig) -> Router {
    Router::new()
        // /metric/*
        .nest("/metric", metric_routes::routes(store.clone()))

        // /system/*
        .nest("/system", system_routes::routes(cfg, store))

        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
