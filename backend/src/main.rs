use backend::config::AppConfig;
use backend::db;
use backend::web_server::{run_server, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Structured logging, overridable through RUST_LOG
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // 2. Config from Config.toml, .env and APP_* variables
    let config = AppConfig::from_env()?;

    // 3. Database pool and migrations
    let db_pool = db::connect(&config.database).await?;

    // 4. Serve
    let app_state = AppState::new(db_pool, config)?;
    tracing::info!("Initializing server...");
    run_server(app_state).await
}
