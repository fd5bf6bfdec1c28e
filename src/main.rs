use anyhow::Context;
use hyperlens::api::{self, AppState};
use hyperlens::datasource::HyperliquidDataSource;
use hyperlens::{Config, WalletDataSource};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("configuration error")?;
    let port = config.port;

    let wallet_source: Arc<dyn WalletDataSource> = Arc::new(HyperliquidDataSource::new(
        config.hyperliquid_api_url.clone(),
    ));

    // Create router
    let app = api::create_router(AppState::new(config, wallet_source));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    // Run server
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
