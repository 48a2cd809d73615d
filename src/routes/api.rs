use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::state::AppState;

/// Current phase, error and latest management response as JSON.
///
/// The draft image is left out; it can be tens of megabytes once encoded.
pub async fn check_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let form = state.form.lock().await;
    let draft = form.draft();

    Json(serde_json::json!({
        "status": form.phase(),
        "message": form.error_message(),
        "latest_response": form.latest_response(),
        "draft": {
            "name": draft.name,
            "date": draft.date,
            "rating": draft.rating,
            "message": draft.message,
            "imageName": draft.image_name,
            "hasImage": draft.image.is_some(),
        }
    }))
}
