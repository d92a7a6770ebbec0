//! Configuration module

use std::env;

use risk_core::constants::{get_database_url, get_model_path};
use risk_core::logic::narrative::{GeminiConfig, DEFAULT_GEMINI_MODEL, DEFAULT_THOUSANDS_SEPARATOR};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// Model artifact written by risk-train
    pub model_path: String,

    /// Gemini API key (GOOGLE_API_KEY, falling back to GEMINI_API_KEY)
    pub llm_api_key: Option<String>,

    pub llm_model: String,

    pub llm_temperature: f32,

    pub llm_timeout_secs: u64,

    /// Grouping character for allowance display
    pub thousands_separator: char,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: get_database_url(),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_path: get_model_path(),

            llm_api_key: env::var("GOOGLE_API_KEY")
                .or_else(|_| env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),

            llm_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),

            llm_temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.3),

            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),

            thousands_separator: env::var("THOUSANDS_SEPARATOR")
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(DEFAULT_THOUSANDS_SEPARATOR),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn gemini(&self) -> GeminiConfig {
        let config = GeminiConfig::default()
            .with_model(self.llm_model.clone())
            .with_temperature(self.llm_temperature)
            .with_timeout(self.llm_timeout_secs);

        match &self.llm_api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}
