use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::OnceLock;
use tera::{Context, Tera};
use tracing::error;

static TERA: OnceLock<Tera> = OnceLock::new();

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| match Tera::new("templates/*.html") {
        Ok(tera) => tera,
        Err(e) => {
            error!("Failed to load templates: {}", e);
            Tera::default()
        }
    })
}

pub fn render_page(name: &str, ctx: &Context) -> Result<String, tera::Error> {
    get_tera().render(name, ctx)
}

pub fn render(name: &str, ctx: &Context) -> Response {
    match render_page(name, ctx) {
        Ok(rendered) => Html(rendered).into_response(),
        Err(e) => {
            error!("Template {} failed to render: {:?}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {}", name)),
            )
                .into_response()
        }
    }
}
