mod error;
mod form;
mod models;
mod submission;

pub use error::GuestbookError;
pub use form::FormState;
#[cfg(test)]
pub use form::IMAGE_TOO_LARGE_MESSAGE;
pub use models::*;
pub use submission::Submitter;
