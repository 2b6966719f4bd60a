//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first when present.

use crate::services::matching::Selection;
use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and checkout redirects
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Path of the catalog JSON file
    pub catalog_path: String,
    /// Gemini model name
    pub gemini_model: String,
    /// How matched rows are picked when a tier has more than needed
    pub match_selection: Selection,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Stripe API secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Gemini API key
    pub gemini_api_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            catalog_path: "data/catalog.json".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            match_selection: Selection::First,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            stripe_secret_key: "sk_test_dummy".to_string(),
            stripe_webhook_secret: "whsec_test".to_string(),
            gemini_api_key: "test_gemini_key".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let match_selection = match env::var("MATCH_SELECTION") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("MATCH_SELECTION"))?,
            Err(_) => Selection::First,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "data/catalog.json".to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            match_selection,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            stripe_secret_key: required_secret("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required_secret("STRIPE_WEBHOOK_SECRET")?,
            gemini_api_key: required_secret("GEMINI_API_KEY")?,
        })
    }
}

fn required_secret(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STRIPE_SECRET_KEY", " sk_test_123 ");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_123");
        env::set_var("GEMINI_API_KEY", "gem_123");
        env::set_var("MATCH_SELECTION", "random");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.stripe_secret_key, "sk_test_123");
        assert_eq!(config.match_selection, Selection::Random);
        assert_eq!(config.port, 8080);
    }
}
