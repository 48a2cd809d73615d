use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

use super::analyzer::SentimentModel;
use crate::guestbook::{AnalysisResult, GuestbookError, ReviewDraft, Sentiment};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Schema,
}

#[derive(Debug, Serialize)]
struct Schema {
    #[serde(rename = "type")]
    schema_type: String,
    properties: SchemaProperties,
    required: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SchemaProperties {
    sentiment: SchemaProperty,
    #[serde(rename = "managementResponse")]
    management_response: SchemaProperty,
}

#[derive(Debug, Serialize)]
struct SchemaProperty {
    #[serde(rename = "type")]
    property_type: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
}

/// Shape the model is asked to answer in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredReply {
    sentiment: String,
    management_response: String,
}

pub struct GeminiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    venue_name: String,
}

impl GeminiAgent {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        venue_name: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            venue_name,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, draft: &ReviewDraft) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(review_prompt(&self.venue_name, draft)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

fn review_prompt(venue_name: &str, draft: &ReviewDraft) -> String {
    format!(
        r#"Analyze this guestbook review for "{venue}" (an elegant wedding/event hall).
Reviewer: {name}
Date: {date}
Rating: {rating}/5
Message: {message}

Tasks:
1. Determine if the sentiment is Positive, Neutral, or Negative.
2. Write a warm, professional, and personalized response from the management (signed "The Management, {venue}"). The response should be empathetic to their experience."#,
        venue = venue_name,
        name = draft.name,
        date = draft.date.format("%Y-%m-%d"),
        rating = draft.rating,
        message = draft.message,
    )
}

fn response_schema() -> Schema {
    Schema {
        schema_type: "OBJECT".to_string(),
        properties: SchemaProperties {
            sentiment: SchemaProperty {
                property_type: "STRING".to_string(),
                description: "The overall sentiment of the review (Positive, Neutral, Negative)."
                    .to_string(),
            },
            management_response: SchemaProperty {
                property_type: "STRING".to_string(),
                description: "A personalized thank you or address from the management."
                    .to_string(),
            },
        },
        required: vec!["sentiment".to_string(), "managementResponse".to_string()],
    }
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("static regex")
    })
}

/// Pull the structured reply out of a `generateContent` response body.
fn parse_reply(body: &str) -> Result<AnalysisResult, GuestbookError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GuestbookError::Analyzer(format!("Parse error: {}", e)))?;

    let text = parsed
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .ok_or_else(|| GuestbookError::Analyzer("No text in response".to_string()))?;

    let json = code_fence()
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map_or(text.as_str(), |m| m.as_str());

    let reply: StructuredReply = serde_json::from_str(json)
        .map_err(|e| GuestbookError::Analyzer(format!("Malformed reply JSON: {}", e)))?;

    let sentiment = Sentiment::parse_label(&reply.sentiment).ok_or_else(|| {
        GuestbookError::Analyzer(format!("Unknown sentiment label: {}", reply.sentiment))
    })?;

    if reply.management_response.trim().is_empty() {
        return Err(GuestbookError::Analyzer("Empty management response".to_string()));
    }

    Ok(AnalysisResult {
        sentiment,
        management_response: reply.management_response,
    })
}

#[async_trait]
impl SentimentModel for GeminiAgent {
    async fn classify(&self, draft: &ReviewDraft) -> Result<AnalysisResult, GuestbookError> {
        info!("Analyzing review with model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(draft))
            .send()
            .await
            .map_err(|e| GuestbookError::Analyzer(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GuestbookError::Analyzer(format!("Response read failed: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&text)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(GuestbookError::Analyzer(format!(
                "Gemini returned {}: {}",
                status, message
            )));
        }

        parse_reply(&text)
    }
}
