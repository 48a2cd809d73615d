use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::error::GuestbookError;

/// Source-size ceiling for an attached photo (20 MiB).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Star rating in the inclusive range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Poor",
            2 => "Fair",
            3 => "Good",
            4 => "Very Good",
            _ => "Excellent",
        }
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating(Self::MAX)
    }
}

impl TryFrom<u8> for Rating {
    type Error = GuestbookError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(GuestbookError::InvalidRating(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The visitor's in-progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub name: String,
    pub date: NaiveDate,
    pub rating: Rating,
    pub message: String,
    /// Photo encoded as a `data:` URI.
    pub image: Option<String>,
    pub image_name: String,
}

impl ReviewDraft {
    /// A blank draft dated `date`.
    pub fn dated(date: NaiveDate) -> Self {
        Self {
            name: String::new(),
            date,
            rating: Rating::default(),
            message: String::new(),
            image: None,
            image_name: String::new(),
        }
    }

    /// Long-form date for display, e.g. "1 May 2024".
    pub fn display_date(&self) -> String {
        self.date.format("%-d %B %Y").to_string()
    }
}

impl Default for ReviewDraft {
    fn default() -> Self {
        Self::dated(today())
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Rating-only classification used when the model is unavailable.
    pub fn from_rating(rating: Rating) -> Self {
        match rating.value() {
            4..=5 => Sentiment::Positive,
            1..=2 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// Case-insensitive match against the three labels.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub management_response: String,
}

/// Outbound payload for the storage webhook. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    name: String,
    date: NaiveDate,
    rating: Rating,
    message: String,
    image: Option<String>,
    image_name: String,
    ai_response: String,
    sentiment: Sentiment,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(draft: &ReviewDraft, analysis: &AnalysisResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: draft.name.clone(),
            date: draft.date,
            rating: draft.rating,
            message: draft.message.clone(),
            image: draft.image.clone(),
            image_name: draft.image_name.clone(),
            ai_response: analysis.management_response.clone(),
            sentiment: analysis.sentiment,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// A file picked by the visitor, before encoding.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The image mime type to embed, if the upload is an image.
    ///
    /// A declared content type is used only when it is a bare `image/<subtype>`
    /// with no parameters; otherwise the file name decides.
    pub fn mime(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| is_plain_image_mime(ct))
            .or_else(|| {
                mime_guess::from_path(&self.file_name)
                    .first_raw()
                    .filter(|guess| is_plain_image_mime(guess))
            })
            .map(str::to_ascii_lowercase)
    }

    pub fn to_data_uri(&self) -> Option<String> {
        use base64::Engine;
        let mime = self.mime()?;
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        Some(format!("data:{};base64,{}", mime, payload))
    }
}

fn is_plain_image_mime(mime: &str) -> bool {
    match mime.split_once('/') {
        Some((kind, subtype)) => {
            kind.eq_ignore_ascii_case("image")
                && !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        }
        None => false,
    }
}
