mod articles;
mod auth;
mod config;
mod error;
mod gallery;
mod routes;
mod store;
mod sweeper;

use std::sync::Arc;

use config::AppConfig;
use routes::{app_router, AppState};
use velora_core::services::DatabaseService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only load .env in development; production uses platform-native env injection.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("velora_api=info".parse().expect("valid directive"))
                .add_directive("velora_core=info".parse().expect("valid directive")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!("Starting velora-api with config: {:?}", config);

    let db = DatabaseService::open_path(&config.database_path)?;
    let state = AppState::new(config.clone(), db.clone());

    tokio::spawn(sweeper::run(
        db,
        state.store.clone(),
        config.deletion_sweep_interval,
    ));

    let bind_addr = config.bind_addr.clone();
    let router = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("velora-api listening on {}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
