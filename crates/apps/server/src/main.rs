use server::config::ServerConfig;
use server::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.addr;
    info!(
        data_root = %config.data_root.display(),
        ttl_secs = config.cache_ttl.as_secs(),
        "loaded configuration"
    );

    let app = router(AppState::from_config(config)?);

    info!("mpa server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
