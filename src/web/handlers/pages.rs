use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::web::state::AppState;
use crate::web::templates::HomeTemplate;
use crate::web::{not_found_page, render};

pub async fn index() -> Response {
    render(StatusCode::OK, HomeTemplate { notice: None })
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fyuur",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus text exposition; 404 when metrics are disabled.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => not_found_page(),
    }
}

pub async fn not_found() -> Response {
    not_found_page()
}
