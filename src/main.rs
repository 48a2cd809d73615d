mod agents;
mod config;
mod guestbook;
mod routes;
mod state;
mod storage;
mod templates;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::agents::{Analyzer, GeminiAgent};
use crate::guestbook::{FormState, Submitter};
use crate::storage::StorageWebhook;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guestbook=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let gemini = GeminiAgent::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.venue_name.clone(),
    )?;
    tracing::info!("Using Gemini model {}", gemini.model());
    let webhook = StorageWebhook::new(config.storage_webhook_url.clone())?;

    let state = Arc::new(state::AppState {
        form: Mutex::new(FormState::new()),
        submitter: Submitter::new(Analyzer::new(Arc::new(gemini)), Arc::new(webhook)),
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("{} guestbook listening on http://{}", config.venue_name, addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
