use std::env;
use std::path::PathBuf;

use crate::models::ResponseModality;

pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash-preview-image-generation";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_KEY_FILE: &str = ".thumbforge/credentials.json";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model_id: String,
    pub response_modalities: Vec<ResponseModality>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub gemini: GeminiConfig,
    /// Process-wide key used when neither the request nor the store has one.
    pub fallback_api_key: Option<String>,
    pub key_file: Option<PathBuf>,
    /// Upper bound on concurrent user submissions. `None` means unbounded.
    pub max_in_flight: Option<usize>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            base_url: DEFAULT_API_BASE.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            response_modalities: vec![ResponseModality::Image, ResponseModality::Text],
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("THUMBFORGE_API_BASE").unwrap_or(defaults.base_url);
        let model_id = env::var("THUMBFORGE_MODEL").unwrap_or(defaults.model_id);

        GeminiConfig {
            base_url,
            model_id,
            response_modalities: defaults.response_modalities,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            gemini: GeminiConfig::default(),
            fallback_api_key: None,
            key_file: None,
            max_in_flight: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let fallback_api_key = env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let key_file = Some(
            env::var("THUMBFORGE_KEY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_KEY_FILE)),
        );
        let max_in_flight = env::var("THUMBFORGE_MAX_IN_FLIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|limit: &usize| *limit > 0);

        Config {
            port,
            gemini: GeminiConfig::from_env(),
            fallback_api_key,
            key_file,
            max_in_flight,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_fallback_api_key(mut self, key: impl Into<String>) -> Self {
        self.fallback_api_key = Some(key.into());
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_flash_image_model() {
        let config = Config::new();
        assert_eq!(config.gemini.model_id, DEFAULT_MODEL_ID);
        assert_eq!(
            config.gemini.response_modalities,
            vec![ResponseModality::Image, ResponseModality::Text]
        );
        assert!(config.max_in_flight.is_none());
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::new()
            .with_port(9000)
            .with_max_in_flight(4)
            .with_gemini(GeminiConfig::new().with_model("custom-model"));
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.max_in_flight, Some(4));
        assert_eq!(config.gemini.model_id, "custom-model");
    }
}
