use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{Level, info};
use viridian_common::images::filesystem::FilesystemImageStore;

use viridian_server::config::AppConfig;
use viridian_server::database::init_db;
use viridian_server::seed::ensure_indexes;
use viridian_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    ensure_indexes(&db).await?;

    let images = FilesystemImageStore::new(
        PathBuf::from(&config.images.dir),
        config.images.base_url.clone(),
        config.images.max_image_size,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        images: Arc::new(images),
        config,
    };
    let app = viridian_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
