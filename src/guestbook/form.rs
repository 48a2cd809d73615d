use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::error::GuestbookError;
use super::models::{
    AnalysisResult, Rating, ReviewDraft, SelectedImage, SubmissionPhase, MAX_IMAGE_BYTES,
};

pub const IMAGE_TOO_LARGE_MESSAGE: &str = "File is too large. Max size is 20MB.";
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please choose an image file (JPEG, PNG).";

/// Owns the draft being authored and where its submission stands.
///
/// Field setters never validate; the required-field check runs in
/// [`FormState::begin_submission`]. The image size check is the one
/// exception and runs when a file is selected.
#[derive(Debug, Default)]
pub struct FormState {
    draft: ReviewDraft,
    phase: SubmissionPhase,
    error_message: Option<String>,
    latest_response: Option<String>,
}

/// Serializable view of the form for templates and the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub draft: ReviewDraft,
    pub display_date: String,
    pub rating_label: &'static str,
    pub phase: SubmissionPhase,
    pub error_message: Option<String>,
    pub latest_response: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ReviewDraft {
        &self.draft
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn latest_response(&self) -> Option<&str> {
        self.latest_response.as_deref()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            draft: self.draft.clone(),
            display_date: self.draft.display_date(),
            rating_label: self.draft.rating.label(),
            phase: self.phase,
            error_message: self.error_message.clone(),
            latest_response: self.latest_response.clone(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.draft.date = date;
    }

    pub fn set_rating(&mut self, rating: Rating) {
        self.draft.rating = rating;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.draft.message = message.into();
    }

    /// Attach a photo. Oversized or non-image files leave the draft untouched and move
    /// the form into the error phase.
    pub fn select_image(&mut self, image: SelectedImage) -> Result<(), GuestbookError> {
        if self.phase == SubmissionPhase::Submitting {
            warn!("Ignored photo {} picked during submission", image.file_name);
            return Err(GuestbookError::SubmissionInProgress);
        }

        let size = image.size();
        if size > MAX_IMAGE_BYTES {
            self.reject_oversized_image(size);
            return Err(GuestbookError::ImageTooLarge { size });
        }

        let Some(data_uri) = image.to_data_uri() else {
            self.reject_image(NOT_AN_IMAGE_MESSAGE);
            return Err(GuestbookError::UnsupportedImage {
                file_name: image.file_name,
            });
        };

        self.draft.image = Some(data_uri);
        self.draft.image_name = image.file_name;
        if self.phase == SubmissionPhase::Error {
            self.phase = SubmissionPhase::Idle;
            self.error_message = None;
        }
        Ok(())
    }

    /// Record an upload that was cut off before its bytes were buffered.
    pub fn reject_oversized_image(&mut self, size: usize) {
        warn!("Rejected photo of {} bytes (limit {})", size, MAX_IMAGE_BYTES);
        self.reject_image(IMAGE_TOO_LARGE_MESSAGE);
    }

    /// A refused file never moves an in-flight submission out of Submitting.
    fn reject_image(&mut self, message: &str) {
        if self.phase == SubmissionPhase::Submitting {
            return;
        }
        self.phase = SubmissionPhase::Error;
        self.error_message = Some(message.to_string());
    }

    pub fn remove_image(&mut self) {
        self.draft.image = None;
        self.draft.image_name.clear();
    }

    pub fn validate(&self) -> Result<(), GuestbookError> {
        if self.draft.name.trim().is_empty() {
            return Err(GuestbookError::MissingField("name"));
        }
        if self.draft.message.trim().is_empty() {
            return Err(GuestbookError::MissingField("message"));
        }
        Ok(())
    }

    /// Idle/Error -> Submitting. Returns the draft to submit.
    pub fn begin_submission(&mut self) -> Result<ReviewDraft, GuestbookError> {
        match self.phase {
            SubmissionPhase::Submitting => return Err(GuestbookError::SubmissionInProgress),
            SubmissionPhase::Success => return Err(GuestbookError::AlreadySubmitted),
            SubmissionPhase::Idle | SubmissionPhase::Error => {}
        }
        self.validate()?;

        self.phase = SubmissionPhase::Submitting;
        self.error_message = None;
        Ok(self.draft.clone())
    }

    /// Submitting -> Success. The draft starts over and the reply is kept
    /// for the thank-you view.
    pub fn complete_submission(&mut self, analysis: AnalysisResult) {
        if self.phase != SubmissionPhase::Submitting {
            warn!("complete_submission called in phase {:?}", self.phase);
        }
        self.draft = ReviewDraft::default();
        self.latest_response = Some(analysis.management_response);
        self.phase = SubmissionPhase::Success;
        info!("Guestbook entry recorded ({})", analysis.sentiment);
    }

    /// Submitting -> Error. The draft is kept so the visitor can retry.
    pub fn fail_submission(&mut self, message: impl Into<String>) {
        self.phase = SubmissionPhase::Error;
        self.error_message = Some(message.into());
    }

    /// Success -> Idle.
    pub fn start_new_entry(&mut self) {
        if self.phase == SubmissionPhase::Success {
            self.phase = SubmissionPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guestbook::models::{today, Sentiment};

    fn image(size: usize) -> SelectedImage {
        SelectedImage {
            file_name: "memory.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0u8; size],
        }
    }

    fn filled() -> FormState {
        let mut form = FormState::new();
        form.set_name("A. Sharma");
        form.set_message("Wonderful hall");
        form
    }

    #[test]
    fn fresh_form_has_default_draft() {
        let form = FormState::new();
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert_eq!(form.draft().rating.value(), 5);
        assert_eq!(form.draft().date, today());
        assert!(form.draft().image.is_none());
        assert!(form.error_message().is_none());
    }

    #[test]
    fn oversized_image_is_rejected_and_draft_unchanged() {
        let mut form = filled();
        form.select_image(image(16)).unwrap();
        let before = form.draft().clone();

        let err = form.select_image(image(MAX_IMAGE_BYTES + 1)).unwrap_err();
        assert!(matches!(err, GuestbookError::ImageTooLarge { .. }));
        assert_eq!(form.draft(), &before);
        assert_eq!(form.phase(), SubmissionPhase::Error);
        assert_eq!(form.error_message(), Some(IMAGE_TOO_LARGE_MESSAGE));
    }

    #[test]
    fn image_at_limit_is_accepted_and_clears_error() {
        let mut form = filled();
        form.fail_submission("network down");

        form.select_image(image(MAX_IMAGE_BYTES)).unwrap();
        assert!(form
            .draft()
            .image
            .as_deref()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        assert_eq!(form.draft().image_name, "memory.jpg");
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert!(form.error_message().is_none());
    }

    #[test]
    fn non_image_file_is_rejected() {
        let mut form = filled();
        let err = form
            .select_image(SelectedImage {
                file_name: "page.html".to_string(),
                content_type: Some("text/html".to_string()),
                bytes: b"<script>".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, GuestbookError::UnsupportedImage { .. }));
        assert!(form.draft().image.is_none());
        assert_eq!(form.phase(), SubmissionPhase::Error);
        assert_eq!(form.error_message(), Some(NOT_AN_IMAGE_MESSAGE));
    }

    #[test]
    fn picks_during_submission_leave_phase_alone() {
        let mut form = filled();
        let submitted = form.begin_submission().unwrap();

        form.reject_oversized_image(MAX_IMAGE_BYTES + 1);
        assert!(matches!(
            form.select_image(image(MAX_IMAGE_BYTES + 1)),
            Err(GuestbookError::SubmissionInProgress)
        ));
        assert!(matches!(
            form.select_image(image(8)),
            Err(GuestbookError::SubmissionInProgress)
        ));

        assert_eq!(form.phase(), SubmissionPhase::Submitting);
        assert!(form.error_message().is_none());
        assert_eq!(form.draft(), &submitted);
    }

    #[test]
    fn remove_image_clears_both_fields() {
        let mut form = filled();
        form.select_image(image(8)).unwrap();
        form.remove_image();
        assert!(form.draft().image.is_none());
        assert!(form.draft().image_name.is_empty());
    }

    #[test]
    fn begin_submission_requires_name_and_message() {
        let mut form = FormState::new();
        form.set_message("Lovely");
        assert!(matches!(
            form.begin_submission(),
            Err(GuestbookError::MissingField("name"))
        ));

        form.set_name("   ");
        assert!(form.begin_submission().is_err());
        assert_eq!(form.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn begin_submission_is_gated_by_phase() {
        let mut form = filled();
        let draft = form.begin_submission().unwrap();
        assert_eq!(draft.name, "A. Sharma");
        assert_eq!(form.phase(), SubmissionPhase::Submitting);

        assert!(matches!(
            form.begin_submission(),
            Err(GuestbookError::SubmissionInProgress)
        ));
    }

    #[test]
    fn completion_resets_draft_and_keeps_response() {
        let mut form = filled();
        form.set_rating(Rating::try_from(2).unwrap());
        form.select_image(image(4)).unwrap();
        form.begin_submission().unwrap();

        form.complete_submission(AnalysisResult {
            sentiment: Sentiment::Negative,
            management_response: "We are sorry".to_string(),
        });

        assert_eq!(form.phase(), SubmissionPhase::Success);
        assert_eq!(form.draft(), &ReviewDraft::dated(today()));
        assert_eq!(form.latest_response(), Some("We are sorry"));

        assert!(matches!(
            form.begin_submission(),
            Err(GuestbookError::AlreadySubmitted)
        ));
        form.start_new_entry();
        assert_eq!(form.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn failure_keeps_draft_and_allows_retry() {
        let mut form = filled();
        let before = form.begin_submission().unwrap();
        form.fail_submission("Failed to save");

        assert_eq!(form.draft(), &before);
        assert_eq!(form.phase(), SubmissionPhase::Error);
        form.set_message("Edited after error");
        assert_eq!(form.phase(), SubmissionPhase::Error);

        assert!(form.begin_submission().is_ok());
        assert!(form.error_message().is_none());
    }

    #[test]
    fn snapshot_carries_display_fields() {
        let form = filled();
        let snap = form.snapshot();
        assert_eq!(snap.rating_label, "Excellent");
        assert_eq!(snap.display_date, form.draft().display_date());
    }
}
