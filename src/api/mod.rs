pub mod health;
pub mod pnl;
pub mod token;

use crate::config::Config;
use crate::datasource::WalletDataSource;
use crate::insight::{CoinGeckoClient, InsightGenerator};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub wallet_source: Arc<dyn WalletDataSource>,
    pub token_client: Arc<CoinGeckoClient>,
    pub insight_generator: Arc<InsightGenerator>,
}

impl AppState {
    pub fn new(config: Config, wallet_source: Arc<dyn WalletDataSource>) -> Self {
        let token_client = Arc::new(CoinGeckoClient::new(config.coingecko_api_url.clone()));
        let insight_generator = Arc::new(InsightGenerator::new(
            config.groq_api_url.clone(),
            config.groq_api_key.clone(),
            config.groq_model.clone(),
        ));
        Self {
            config,
            wallet_source,
            token_client,
            insight_generator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/hyperliquid/:wallet/pnl", get(pnl::get_wallet_pnl))
        .route("/api/token/:id/insight", post(token::get_token_insight))
        .layer(cors)
        .with_state(state)
}
