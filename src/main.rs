use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cinemood::api::{create_router, AppState};
use cinemood::config::Config;
use cinemood::db::{create_redis_client, RedisStore};
use cinemood::services::providers::HttpTextGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinemood=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Initialize application state
    let mut state = match config.redis_url.as_deref() {
        Some(url) => {
            let client = create_redis_client(url)?;
            tracing::info!("Using Redis store");
            AppState::with_store(RedisStore::new(client))
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-memory store");
            AppState::new()
        }
    };

    if let Some(api_url) = config.text_api_url.clone() {
        let generator = HttpTextGenerator::new(api_url, config.text_api_key.clone())?;
        state = state.with_generator(Arc::new(generator));
        tracing::info!("Text generation enabled");
    }

    if let Some(seed) = config.rng_seed {
        state = state.with_rng_seed(seed);
        tracing::info!(seed, "Recommendation RNG is seeded");
    }

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
