use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::web::handlers::{artists, pages, shows, venues};
use crate::web::state::AppState;

pub fn app_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route("/metrics", get(pages::metrics))
        // Venues
        .route("/venues", get(venues::list))
        .route("/venues/search", post(venues::search))
        .route("/venues/create", get(venues::create_form).post(venues::create_submission))
        .route("/venues/:id", get(venues::detail).delete(venues::delete))
        .route("/venues/:id/edit", get(venues::edit_form).post(venues::edit_submission))
        // Artists
        .route("/artists", get(artists::list))
        .route("/artists/search", post(artists::search))
        .route("/artists/create", get(artists::create_form).post(artists::create_submission))
        .route("/artists/:id", get(artists::detail))
        .route("/artists/:id/edit", get(artists::edit_form).post(artists::edit_submission))
        // Shows
        .route("/shows", get(shows::list))
        .route("/shows/create", get(shows::create_form).post(shows::create_submission))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
