pub mod extract;
pub mod openapi;
pub mod pages;

use crate::AppState;
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

/// Discovery, health and the OpenAPI document, plus every page tool.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/openapi.json", get(openapi_handler))
        .merge(pages::pages_router())
}

// some clients request / before /openapi.json
async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": openapi::API_TITLE,
        "openapi": "/openapi.json",
        "docs": "/openapi.json",
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn openapi_handler(State(state): State<AppState>) -> Json<Value> {
    Json(openapi::openapi_document(&state.config.default_locale))
}
