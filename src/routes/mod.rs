mod api;
mod pages;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::guestbook::MAX_IMAGE_BYTES;
use crate::state::AppState;

pub use api::check_status;
pub use pages::{index, remove_photo, select_photo, start_new_entry, submit};

/// Room for the multipart framing and text fields around a full-size photo.
const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES * 2;

pub fn router(state: Arc<AppState>) -> Router {
    with_body_limit(state, MAX_BODY_BYTES)
}

fn with_body_limit(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/photo", post(select_photo))
        .route("/photo/remove", post(remove_photo))
        .route("/submit", post(submit))
        .route("/new", post(start_new_entry))
        .route("/api/status", get(check_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
