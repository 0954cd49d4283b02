//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{JsonStatsStore, DocumentExtractor},
    config::{Config, ConfigError},
    error::ApiError,
    web::{eviction_process, router, ApiDoc, AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let stats_store = Arc::new(JsonStatsStore::open(&config.data_dir)?);
    info!("Stats stored under {}", stats_store.base_dir().display());
    let extractor = Arc::new(DocumentExtractor::new(config.max_document_size, config.max_pdf_pages));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), stats_store, extractor));

    // --- 4. Start Background Tasks ---
    let shutdown = CancellationToken::new();
    let eviction_task = config.session_idle_timeout.map(|max_idle| {
        tokio::spawn(eviction_process(
            app_state.clone(),
            max_idle,
            config.eviction_interval,
            shutdown.clone(),
        ))
    });

    // --- 5. Create the Web Router ---
    let cors = cors_layer(&config.cors_origin)?;
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(task) = eviction_task {
        if let Err(e) = task.await {
            error!("Eviction task failed: {}", e);
        }
    }
    info!("Server stopped.");
    Ok(())
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    Ok(layer.allow_origin(origin))
}

/// Resolves on Ctrl-C, or when the token is cancelled elsewhere.
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received.");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}
