//! HTTP surface of the MPA monitoring service.

pub mod config;
pub mod dashboard;
pub mod datasets;
pub mod error;
pub mod upstream;
pub mod vessels;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use catalog::TabularStore;
use streaming::PresenceService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::upstream::GfwClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<TabularStore>,
    /// `None` when no upstream credential is configured.
    pub presence: Option<PresenceService>,
}

impl AppState {
    pub fn new(config: ServerConfig, presence: Option<PresenceService>) -> Self {
        let store = TabularStore::new(&config.data_root);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            presence,
        }
    }

    /// State backed by the live GFW client when a token is configured.
    pub fn from_config(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let presence = match config.gfw_token.clone() {
            Some(token) => {
                let client = GfwClient::new(&config, token)?;
                Some(PresenceService::new(Arc::new(client), config.cache_ttl))
            }
            None => {
                warn!("GFW_API_TOKEN is not set; /api/vessels will answer 500");
                None
            }
        };
        Ok(Self::new(config, presence))
    }
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/vessels", get(vessels::get_vessels))
        .route("/api/vessels/flags", get(vessels::get_vessel_flags))
        .route("/api/vessels/profile", get(vessels::get_vessel_profile))
        .route("/api/datasets/:dataset", get(datasets::list_dataset))
        .route("/api/datasets/:dataset/:file", get(datasets::get_table))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
