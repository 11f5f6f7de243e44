//! Motor tracker
//!
//! REST backend tracking industrial motors, the plant equipment they are
//! installed on and their maintenance history.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::auth_middleware, cors::cors_layer};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    // everything under /api except login requires a bearer token
    let protected = Router::new()
        .nest("/api/motors", routes::create_motor_router())
        .nest("/api/equipment", routes::create_equipment_router())
        .nest("/api/reports", routes::create_report_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/auth", routes::create_auth_router())
        .merge(protected)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Motor Maintenance Tracker API is running..."
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
