use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Datelike;
use std::sync::Arc;
use tera::Context;
use tracing::{info, warn};

use crate::guestbook::{FormState, GuestbookError, Rating, SelectedImage, MAX_IMAGE_BYTES};
use crate::state::AppState;
use crate::templates::render;

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    render_index(&state, None).await
}

/// Text fields and an optional photo from the entry form.
#[derive(Default)]
struct EntryForm {
    name: Option<String>,
    rating: Option<Rating>,
    message: Option<String>,
    photo: Option<PhotoUpload>,
}

enum PhotoUpload {
    Accepted(SelectedImage),
    Oversized(usize),
}

impl EntryForm {
    fn apply_fields(&mut self, form: &mut FormState) {
        if let Some(name) = self.name.take() {
            form.set_name(name);
        }
        if let Some(rating) = self.rating {
            form.set_rating(rating);
        }
        if let Some(message) = self.message.take() {
            form.set_message(message);
        }
    }

    /// Returns false if the photo was refused.
    fn apply_photo(&mut self, form: &mut FormState) -> bool {
        match self.photo.take() {
            Some(PhotoUpload::Accepted(image)) => form.select_image(image).is_ok(),
            Some(PhotoUpload::Oversized(size)) => {
                form.reject_oversized_image(size);
                false
            }
            None => true,
        }
    }
}

async fn read_entry(mut multipart: Multipart) -> EntryForm {
    let mut entry = EntryForm::default();

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    entry.photo = Some(PhotoUpload::Oversized(MAX_IMAGE_BYTES + 1));
                } else {
                    warn!("Malformed entry form: {}", e);
                }
                break;
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" | "message" | "rating" => {
                let Ok(text) = field.text().await else { continue };
                match name.as_str() {
                    "name" => entry.name = Some(text),
                    "message" => entry.message = Some(text),
                    _ => {
                        entry.rating = text
                            .trim()
                            .parse::<u8>()
                            .ok()
                            .and_then(|r| Rating::try_from(r).ok())
                    }
                }
            }
            "photo" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let mut bytes = Vec::new();
                let mut oversized = false;

                loop {
                    match field.chunk().await {
                        Ok(Some(chunk)) => {
                            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                                oversized = true;
                                break;
                            }
                            bytes.extend_from_slice(&chunk);
                        }
                        Ok(None) => break,
                        Err(e) => {
                            oversized = e.status() == StatusCode::PAYLOAD_TOO_LARGE;
                            if !oversized {
                                warn!("Photo upload interrupted: {}", e);
                            }
                            break;
                        }
                    }
                }

                if oversized {
                    entry.photo = Some(PhotoUpload::Oversized(MAX_IMAGE_BYTES + 1));
                    break;
                }
                // A file input with nothing chosen still sends an empty part.
                if !file_name.is_empty() && !bytes.is_empty() {
                    entry.photo = Some(PhotoUpload::Accepted(SelectedImage {
                        file_name,
                        content_type,
                        bytes,
                    }));
                }
            }
            _ => {}
        }
    }

    entry
}

pub async fn select_photo(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let mut entry = read_entry(multipart).await;
    {
        let mut form = state.form.lock().await;
        entry.apply_fields(&mut form);
        entry.apply_photo(&mut form);
    }
    Redirect::to("/").into_response()
}

pub async fn remove_photo(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let mut entry = read_entry(multipart).await;
    {
        let mut form = state.form.lock().await;
        entry.apply_fields(&mut form);
        form.remove_image();
    }
    Redirect::to("/").into_response()
}

pub async fn submit(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let mut entry = read_entry(multipart).await;
    {
        let mut form = state.form.lock().await;
        entry.apply_fields(&mut form);
        if !entry.apply_photo(&mut form) {
            return Redirect::to("/").into_response();
        }
    }

    match state.submitter.submit(&state.form).await {
        Ok(phase) => {
            info!("Submission settled in phase {:?}", phase);
            Redirect::to("/").into_response()
        }
        Err(GuestbookError::MissingField(field)) => {
            let notice = format!("Please fill in your {}.", field);
            render_index(&state, Some(notice)).await.into_response()
        }
        Err(e) => {
            warn!("Submit refused: {}", e);
            Redirect::to("/").into_response()
        }
    }
}

pub async fn start_new_entry(State(state): State<Arc<AppState>>) -> Response {
    state.form.lock().await.start_new_entry();
    Redirect::to("/").into_response()
}

async fn render_index(state: &AppState, notice: Option<String>) -> impl IntoResponse {
    let snapshot = state.form.lock().await.snapshot();

    let mut ctx = Context::new();
    ctx.insert("venue_name", &state.config.venue_name);
    ctx.insert("review_link", &state.config.review_link);
    ctx.insert("form", &snapshot);
    ctx.insert("notice", &notice);
    ctx.insert("year", &chrono::Utc::now().year());
    render("index.html", &ctx)
}
