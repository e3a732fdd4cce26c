use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use termplan::catalog::CatalogIndex;
use termplan::db::PlannerDb;
use termplan::server;
use termplan::server::cache::ConflictCache;
use termplan::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let catalog_dir =
        std::env::var("TERMPLAN_CATALOG_DIR").unwrap_or_else(|_| "data/catalog".to_owned());
    let db_path = std::env::var("TERMPLAN_DB").unwrap_or_else(|_| "termplan.sqlite".to_owned());
    let bind_addr = std::env::var("TERMPLAN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());

    let catalog = CatalogIndex::load_from_directory(Path::new(&catalog_dir))
        .map_err(|e| anyhow::anyhow!("failed to load catalog from {catalog_dir}: {e}"))?;
    info!(
        "Loaded catalog from {} ({} terms)",
        catalog_dir,
        catalog.term_codes().len()
    );

    let state = Arc::new(AppState {
        db: PlannerDb::new(&db_path),
        catalog,
        conflict_cache: ConflictCache::new(),
    });

    let router = server::create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
    }
}
