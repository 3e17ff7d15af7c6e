//! Process configuration, loaded once and passed to the API client

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.rentcast.io/v1";
pub const DEFAULT_COMP_COUNT: u32 = 5;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub comp_count: u32, // only sent to the value endpoint
}

impl Config {
    /// Config with defaults for everything but the credentials and endpoint
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            base_url: base_url.into(),
            output_dir: PathBuf::from("."),
            comp_count: DEFAULT_COMP_COUNT,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api_key: env::var("RENTCAST_API_KEY").context("RENTCAST_API_KEY must be set")?,

            base_url: env::var("RENTCAST_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),

            output_dir: env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),

            comp_count: env::var("COMP_COUNT")
                .unwrap_or_else(|_| DEFAULT_COMP_COUNT.to_string())
                .parse()
                .context("COMP_COUNT must be a valid number")?,
        })
    }

    /// Endpoint URL for a path relative to the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = Config::new("key", "https://api.rentcast.io/v1/");
        assert_eq!(
            config.endpoint("/avm/value"),
            "https://api.rentcast.io/v1/avm/value"
        );

        let config = Config::new("key", "http://127.0.0.1:1234");
        assert_eq!(
            config.endpoint("avm/rent/long-term"),
            "http://127.0.0.1:1234/avm/rent/long-term"
        );
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = Config::new("key", DEFAULT_BASE_URL);
        assert_eq!(config.comp_count, 5);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }
}
