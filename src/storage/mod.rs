use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::guestbook::{GuestbookError, SubmissionRecord};

/// Destination for finished guestbook records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn forward(&self, record: &SubmissionRecord) -> Result<(), GuestbookError>;
}

/// Posts records to the spreadsheet-backed Apps Script web app.
///
/// The endpoint does not expose its response to callers, so a dispatched
/// request counts as delivered. The response status and body are dropped
/// unread; a rejection on the remote side looks the same as success.
pub struct StorageWebhook {
    client: Client,
    url: String,
}

impl StorageWebhook {
    pub fn new(url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl RecordSink for StorageWebhook {
    async fn forward(&self, record: &SubmissionRecord) -> Result<(), GuestbookError> {
        let body = serde_json::to_string(record)
            .map_err(|e| GuestbookError::Storage(format!("Serialize failed: {}", e)))?;

        self.client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| GuestbookError::Storage(format!("Request failed: {}", e)))?;

        info!("Forwarded guestbook entry from {} to storage webhook", record.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::fallback_analysis;
    use crate::guestbook::ReviewDraft;

    #[tokio::test]
    async fn unreachable_webhook_is_a_storage_error() {
        let webhook = StorageWebhook::new("http://127.0.0.1:9/exec".to_string()).unwrap();
        let draft = ReviewDraft::default();
        let record = SubmissionRecord::new(&draft, &fallback_analysis(draft.rating), chrono::Utc::now());

        let err = webhook.forward(&record).await.unwrap_err();
        assert!(matches!(err, GuestbookError::Storage(_)));
    }
}
