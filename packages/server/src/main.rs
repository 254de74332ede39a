use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::seed::{ensure_indexes, seed_badges};
use server::services::notify::build_mailer;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("failed to connect to database")?;
    seed_badges(&db).await?;
    ensure_indexes(&db).await?;

    let mailer = build_mailer(&config.email)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        mailer,
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
