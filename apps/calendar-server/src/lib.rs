//! Calendar event server
//!
//! Clients register for a guid, then create and query calendar events scoped
//! to it. Responses are rendered as JSON, compact JSON, XML or plain text
//! depending on the extension of the requested resource.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use event_store::EventStore;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let router = api::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Creates the application state with the given configuration and store.
pub fn create_state(config: ServerConfig, store: Arc<dyn EventStore>) -> AppState {
    AppState::new(config, store)
}

fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    if !config.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("calendar_server={log_level},tower_http={log_level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
