use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Runtime configuration, loaded from `config.toml` when present.
/// Every field has a default so the binary runs without a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Endpoint that relays chat-completion requests to OpenRouter.
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_seconds: u64,
    /// Network attempts per fetch before giving up.
    pub attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Durable store for normalized itineraries.
    pub path: String,
    pub retention_hours: i64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 1200,
            temperature: 0.7,
            timeout_seconds: 60,
            attempts: 1,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "aiItineraryCache.json".to_string(),
            retention_hours: 72,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            warn!("No config file found at '{}', using defaults", config_path);
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
