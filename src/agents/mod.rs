mod analyzer;
mod gemini;

pub use analyzer::{Analyzer, SentimentModel};
#[cfg(test)]
pub use analyzer::{fallback_analysis, FALLBACK_RESPONSE};
pub use gemini::{GeminiAgent, DEFAULT_BASE_URL, DEFAULT_MODEL};
