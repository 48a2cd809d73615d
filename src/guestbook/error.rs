/// Errors surfaced by the guestbook form and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum GuestbookError {
    #[error("image of {size} bytes exceeds the 20MB limit")]
    ImageTooLarge { size: usize },

    #[error("{file_name} is not an image")]
    UnsupportedImage { file_name: String },

    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("rating {0} is outside 1..=5")]
    InvalidRating(u8),

    #[error("a submission is already in progress")]
    SubmissionInProgress,

    #[error("entry already submitted; start a new entry first")]
    AlreadySubmitted,

    /// The generative model call failed or returned something unusable.
    #[error("analyzer error: {0}")]
    Analyzer(String),

    /// The storage webhook could not be reached.
    #[error("storage webhook error: {0}")]
    Storage(String),
}
