use anyhow::Context;
use golf_course_backend::config::Config;
use golf_course_backend::routes;
use golf_course_backend::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::from_config(config)
        .await
        .context("Failed to open the database")?;
    let app = routes::app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Server starting on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
