mod api;
mod config;
mod cors;
mod dto;
mod error;
mod router;
mod state;
mod static_files;

use std::sync::Arc;

use anyhow::Context;
use studio_core::{DiskStore, ExclusionPrefixes, FileStore, SearchClient, StaticAssetResolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_web=debug,studio_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;

    let store: Arc<dyn FileStore> = Arc::new(
        DiskStore::new(&config.assets.document_root).with_context(|| {
            format!(
                "Failed to open document root {}",
                config.assets.document_root.display()
            )
        })?,
    );

    let assets = StaticAssetResolver::new(
        store.clone(),
        ExclusionPrefixes::new(&config.assets.exclusion_prefixes),
    )
    .with_fallback_document(&config.assets.fallback_document)?;
    assets
        .ensure_fallback()
        .await
        .context("Fallback document is not servable")?;
    tracing::info!(
        "Serving {} (fallback: {}, excluded: {:?})",
        config.assets.document_root.display(),
        assets.fallback_document(),
        config.assets.exclusion_prefixes
    );

    let search = SearchClient::new(&config.search).context("Failed to create search client")?;

    // Connectivity is not required to start; only log what we find.
    let startup_check = search.clone();
    tokio::spawn(async move {
        match startup_check.info().await {
            Ok(info) => tracing::info!(
                "Connected to search cluster {} (node {}, version {})",
                info.cluster_name,
                info.name,
                info.version.number
            ),
            Err(e) => tracing::warn!("Search engine not reachable at startup: {e}"),
        }
    });

    let state = AppState {
        config: Arc::new(config),
        assets: Arc::new(assets),
        store,
        search,
    };

    let app = router::build_router(state)?;

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("studio-web listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
