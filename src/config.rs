use crate::agents::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_VENUE_NAME: &str = "Shri Krishna Mahal";
pub const DEFAULT_REVIEW_LINK: &str = "https://maps.app.goo.gl/ZYEZsXKHkDQsRvGV9";

#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub storage_webhook_url: String,
    pub venue_name: String,
    pub review_link: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .filter(|k| !k.is_empty())
            .ok_or("GEMINI_API_KEY must be set")?;

        let storage_webhook_url = get("STORAGE_WEBHOOK_URL")
            .filter(|u| !u.is_empty())
            .ok_or("STORAGE_WEBHOOK_URL must be set")?;

        let gemini_model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let gemini_base_url =
            get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let venue_name = get("VENUE_NAME").unwrap_or_else(|| DEFAULT_VENUE_NAME.to_string());
        let review_link = get("REVIEW_LINK").unwrap_or_else(|| DEFAULT_REVIEW_LINK.to_string());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = get("PORT")
            .unwrap_or_else(|| "5001".to_string())
            .parse()
            .unwrap_or(5001);

        Ok(Self {
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            storage_webhook_url,
            venue_name,
            review_link,
            host,
            port,
        })
    }
}
