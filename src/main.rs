use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use marquee_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, CatalogStore},
    services::{PosterResolver, TmdbPosterSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    // The server never starts without a consistent catalog
    let store = CatalogStore::load(&config.catalog_path, &config.similarity_path).map_err(|e| {
        tracing::error!(error = %e, "Failed to load movie catalog");
        e
    })?;

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            tracing::info!("Poster caching enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let source = TmdbPosterSource::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
        config.poster_timeout(),
    )
    .context("Failed to build TMDB client")?;
    let posters = PosterResolver::new(Arc::new(source), cache);

    let app = create_router(AppState::new(store, posters));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
