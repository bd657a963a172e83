use std::net::SocketAddr;
use std::sync::Arc;

use screamer::config::Config;
use screamer::storage::ImageStore;
use screamer::{init_db, run_app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let pool = init_db(&config.database_url).await?;
    let images = ImageStore::new(&config.image_dir, &config.base_url)?;
    let state = Arc::new(AppState::new(pool, images));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Server started on {addr}");
    run_app(state, addr).await
}
