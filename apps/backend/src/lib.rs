pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::services::completion::{OpenAiProviderFactory, ProviderFactory};
use crate::services::extraction::{DocumentExtractor, TextExtractor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<dyn TextExtractor>,
    pub providers: Arc<dyn ProviderFactory>,
}

impl AppState {
    /// State with the production extractor and OpenAI-compatible providers.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let providers = OpenAiProviderFactory::new(config.llm_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            extractor: Arc::new(DocumentExtractor::new()),
            providers: Arc::new(providers),
        })
    }
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/options", get(routes::options::list))
        .route("/api/generate", post(routes::generate::generate))
        .route("/api/export", post(routes::export::export))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    if config.llm_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; requests must supply llm_key");
    }
    tracing::info!(
        model = %config.llm_model,
        format = ?config.response_format,
        export_dir = %config.export_dir.display(),
        "configuration loaded"
    );

    let addr = config.bind_addr();
    let app = router(AppState::from_config(config)?);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
