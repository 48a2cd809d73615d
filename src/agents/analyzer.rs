use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::guestbook::{AnalysisResult, GuestbookError, Rating, ReviewDraft, Sentiment};

pub const FALLBACK_RESPONSE: &str = "Thank you so much for your feedback! We are honored to have been part of your special occasion. - The Management, Shri Krishna Mahal";

/// A model that reads a draft and proposes a sentiment and reply.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify(&self, draft: &ReviewDraft) -> Result<AnalysisResult, GuestbookError>;
}

/// Deterministic analysis from the rating alone.
pub fn fallback_analysis(rating: Rating) -> AnalysisResult {
    AnalysisResult {
        sentiment: Sentiment::from_rating(rating),
        management_response: FALLBACK_RESPONSE.to_string(),
    }
}

/// Wraps a [`SentimentModel`] so that analysis never fails.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn SentimentModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, draft: &ReviewDraft) -> AnalysisResult {
        match self.model.classify(draft).await {
            Ok(result) => {
                info!("Model classified review from {} as {}", draft.name, result.sentiment);
                result
            }
            Err(e) => {
                warn!("Sentiment model failed, using rating fallback: {}", e);
                fallback_analysis(draft.rating)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Unavailable;

    #[async_trait]
    impl SentimentModel for Unavailable {
        async fn classify(&self, _: &ReviewDraft) -> Result<AnalysisResult, GuestbookError> {
            Err(GuestbookError::Analyzer("connection refused".to_string()))
        }
    }

    struct Canned(AnalysisResult);

    #[async_trait]
    impl SentimentModel for Canned {
        async fn classify(&self, _: &ReviewDraft) -> Result<AnalysisResult, GuestbookError> {
            Ok(self.0.clone())
        }
    }

    fn draft(rating: u8) -> ReviewDraft {
        ReviewDraft {
            name: "A. Sharma".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            rating: Rating::try_from(rating).unwrap(),
            message: "Wonderful hall".to_string(),
            image: None,
            image_name: String::new(),
        }
    }

    #[tokio::test]
    async fn fallback_covers_every_rating() {
        let analyzer = Analyzer::new(Arc::new(Unavailable));
        for r in 1..=5u8 {
            let result = analyzer.analyze(&draft(r)).await;
            let expected = if r >= 4 {
                Sentiment::Positive
            } else if r <= 2 {
                Sentiment::Negative
            } else {
                Sentiment::Neutral
            };
            assert_eq!(result.sentiment, expected, "rating {}", r);
            assert_eq!(result.management_response, FALLBACK_RESPONSE);
        }
    }

    #[tokio::test]
    async fn five_star_review_falls_back_to_positive() {
        let analyzer = Analyzer::new(Arc::new(Unavailable));
        let result = analyzer.analyze(&draft(5)).await;
        assert_eq!(
            result,
            AnalysisResult {
                sentiment: Sentiment::Positive,
                management_response: "Thank you so much for your feedback! We are honored to have been part of your special occasion. - The Management, Shri Krishna Mahal".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn low_ratings_fall_back_to_negative_and_neutral() {
        let analyzer = Analyzer::new(Arc::new(Unavailable));
        assert_eq!(analyzer.analyze(&draft(2)).await.sentiment, Sentiment::Negative);
        assert_eq!(analyzer.analyze(&draft(3)).await.sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn model_result_passes_through() {
        let reply = AnalysisResult {
            sentiment: Sentiment::Neutral,
            management_response: "Thank you, we will look into the parking.".to_string(),
        };
        let analyzer = Analyzer::new(Arc::new(Canned(reply.clone())));
        assert_eq!(analyzer.analyze(&draft(5)).await, reply);
    }
}
