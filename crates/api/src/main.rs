use roleguard_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    roleguard_observability::init();

    let config = ApiConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let state = app::services::build_state(&config).await?;
    let router = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
