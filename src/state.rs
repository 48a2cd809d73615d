use crate::config::Config;
use crate::guestbook::{FormState, Submitter};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The kiosk's single form, plus what it needs to submit.
pub struct AppState {
    pub form: Mutex<FormState>,
    pub submitter: Submitter,
    pub config: Arc<Config>,
}
