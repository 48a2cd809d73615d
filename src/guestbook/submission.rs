use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::error::GuestbookError;
use super::form::FormState;
use super::models::{SubmissionPhase, SubmissionRecord};
use crate::agents::Analyzer;
use crate::storage::RecordSink;

pub const SAVE_FAILED_MESSAGE: &str =
    "Failed to save your review to the guestbook. Please check your connection.";

/// Runs one submission: analyze, build the record, forward it, then settle
/// the form into Success or Error.
///
/// The form lock is released while the two network calls are in flight;
/// the Submitting phase keeps a second submit out in the meantime.
#[derive(Clone)]
pub struct Submitter {
    analyzer: Analyzer,
    sink: Arc<dyn RecordSink>,
}

impl Submitter {
    pub fn new(analyzer: Analyzer, sink: Arc<dyn RecordSink>) -> Self {
        Self { analyzer, sink }
    }

    /// Returns the phase the form settled in. `Err` means the submit was
    /// refused before anything was sent (invalid draft or wrong phase).
    pub async fn submit(&self, form: &Mutex<FormState>) -> Result<SubmissionPhase, GuestbookError> {
        let draft = form.lock().await.begin_submission()?;

        let analysis = self.analyzer.analyze(&draft).await;
        let record = SubmissionRecord::new(&draft, &analysis, Utc::now());
        info!("Forwarding {} entry from {}", record.sentiment(), record.name());

        match self.sink.forward(&record).await {
            Ok(()) => {
                let mut form = form.lock().await;
                form.complete_submission(analysis);
                Ok(form.phase())
            }
            Err(e) => {
                error!("Submission error: {}", e);
                let mut form = form.lock().await;
                form.fail_submission(SAVE_FAILED_MESSAGE);
                Ok(form.phase())
            }
        }
    }
}
