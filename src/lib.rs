//! # Dataforge - synthetic data service
//!
//! Dataforge turns an interactively built record schema into batches of
//! synthetic records and optionally POSTs each batch to downstream HTTP
//! endpoints.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataforge::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema model, builder validation, error taxonomy, ports
//! - **Adapters**: HTTP handlers, generator transports, record synthesis, delivery
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::delivery::DeliveryFanout;
use crate::adapters::generate_handler::{self, GenerateState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::ui_handler::UIHandler;
use crate::config::Settings;
use crate::domain::GeneratorPort;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `settings` - Application settings
/// * `generator` - Generation client behind `/generate` and `/api/submit`
/// * `delivery` - Fanout used for submissions that name delivery targets
pub fn create_app(
    settings: Arc<Settings>,
    generator: Arc<dyn GeneratorPort>,
    delivery: DeliveryFanout,
) -> Router {
    let health_handler = Arc::new(HealthHandler::new(settings.clone()));

    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let state = GenerateState { generator, delivery };

    let api_router = Router::new()
        .route("/schema/validate", post(generate_handler::validate_schema))
        .route("/submit", post(generate_handler::submit))
        .with_state(state.clone());

    let router = Router::new()
        .route("/generate", post(generate_handler::generate))
        .with_state(state)
        .nest("/api", api_router)
        .merge(health_router);

    // UI endpoint (catch-all)
    let router = match &settings.ui.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(UIHandler::serve),
    };

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
