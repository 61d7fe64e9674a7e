use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::config::AppConfig;
use crate::state::store::KeyStore;

#[derive(Clone)]
struct SystemState {
    config: AppConfig,
    store: KeyStore<String>,
}

pub fn routes(config: AppConfig, store: KeyStore<String>) -> Router {
    Router::new()
        .route("/alive", get(is_alive))
        .route("/version", get(version))
        .with_state(SystemState { config, store })
}

/// GET /system/alive
async fn is_alive() -> &'static str {
    "OK"
}

/// GET /system/version
async fn version(State(state): State<SystemState>) -> Json<serde_json::Value> {
    Json(json!({
        "version": state.config.server_version,
        "keys": state.store.key_count(),
    }))
}
