/*****************************************************************************************
 *
 *  TallyDB – Rolling per-key value counters over HTTP
 *  --------------------------------------------------
 *
 *  Every observation is counted for one expiry window, then decremented.
 *
 *****************************************************************************************/

use std::process::ExitCode;

use tokio::net::TcpListener;
use axum::serve;

use tracing_subscriber::FmtSubscriber;

use tallydb::app;
use tallydb::config::AppConfig;
use tallydb::errors::AppError;
use tallydb::state::KeyStore;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tallydb: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    //
    // ────────────────────────────────────────────────────────
    //  Locate and load config.json (EXE folder or its parent)
    // ────────────────────────────────────────────────────────
    //
    let exe_path = std::env::current_exe()?;
    let exe_dir = exe_path
        .parent()
        .ok_or_else(|| AppError::ConfigMissing(exe_path.display().to_string()))?;

    let config_path = AppConfig::locate(exe_dir)?;
    let cfg = AppConfig::load_from_file(&config_path)?;

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cfg.level_filter())
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tallydb: a global tracing subscriber was already set");
    }

    tracing::info!("Starting TallyDB…");
    tracing::info!("Loaded configuration from {}: {:?}", config_path.display(), cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Create the counting store
    // ────────────────────────────────────────────────────────
    //
    let store: KeyStore<String> = KeyStore::with_ttl(cfg.expiry());
    tracing::info!("Observations expire after {}s", cfg.expiry_seconds);

    //
    // ────────────────────────────────────────────────────────
    //  Build Axum app (metric + system routes)
    // ────────────────────────────────────────────────────────
    //
    let app = app::build_app(store, cfg.clone());

    //
    // ────────────────────────────────────────────────────────
    //  Bind server and start listening
    // ────────────────────────────────────────────────────────
    //
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    Ok(())
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    // Pending expiries are not persisted; counts start empty next run.
    tracing::warn!("CTRL+C received, shutting down");
}
