use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fablepress_auth::{config::Settings, router, store::FlatFileStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    let settings = Settings::load().or_else(|_| Settings::load_from("config/default.toml"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log_level)?)
        .init();

    // Create the branch store and open the master branch
    let store = Arc::new(FlatFileStore::new(&settings.data_dir)?);
    let state = Arc::new(AppState::new(store, settings).await?);

    // Create the router
    let app = router::create_router(state.clone());

    // Start the server
    let addr = state.settings.bind_addr;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
