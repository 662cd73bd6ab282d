//! HTTP webhook API.
//!
//! Two unauthenticated health checks plus the five `POST /send-*-dm`
//! endpoints the applicant-tracking system calls.

pub mod auth;
pub mod handlers;


use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::RelayService;

/// Build the router over a shared service.
///
/// CORS is permissive unless `server.cors_origins` lists specific origins.
pub fn build_router(service: Arc<RelayService>) -> Router {
    let origins = &service.config().server.cors_origins;
    let cors = if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    handlers::routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
