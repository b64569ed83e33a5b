pub mod handlers;
pub mod notice;
pub mod router;
pub mod state;
pub mod templates;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::error::StoreError;
use templates::ErrorTemplate;

pub use router::app_router;
pub use state::AppState;

/// Render `template` with `status`. A template failure becomes a bare 500.
pub fn render<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Outcome of a read path that did not produce its page.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    Store(StoreError),
}

impl From<StoreError> for PageError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => PageError::NotFound,
            other => PageError::Store(other),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => not_found_page(),
            PageError::Store(e) => {
                error!("Storage failure while rendering page: {}", e);
                server_error_page()
            }
        }
    }
}

pub fn not_found_page() -> Response {
    render(
        StatusCode::NOT_FOUND,
        ErrorTemplate {
            status_code: 404,
            title: "Not Found",
            message: "The page you are looking for does not exist.".to_string(),
        },
    )
}

pub fn server_error_page() -> Response {
    render(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorTemplate {
            status_code: 500,
            title: "Server Error",
            message: "Something went wrong on our end. Please try again later.".to_string(),
        },
    )
}

/// Path ids that are not positive integers are treated as unknown pages.
pub fn parse_path_id(raw: &str) -> Result<i64, PageError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(PageError::NotFound),
    }
}
