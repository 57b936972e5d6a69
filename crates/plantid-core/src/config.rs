//! Configuration and settings management
//!
//! Loads analysis settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default vision model used when `OPENAI_VISION_MODEL` is not set.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Default timeout for a single model HTTP call, in seconds.
pub const DEFAULT_LLM_HTTP_TIMEOUT_SECS: u64 = 60;
/// Default completion token limit for an analysis reply.
pub const DEFAULT_ANALYSIS_MAX_TOKENS: u32 = 800;
/// Default sampling temperature for analysis calls.
pub const DEFAULT_ANALYSIS_TEMPERATURE: f32 = 0.2;

/// Build the layered configuration shared by all crates.
///
/// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__`-prefixed environment, plain environment.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE env vars map to snake_case keys; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings for the model call made by the analysis client
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisSettings {
    /// API key for the OpenAI-compatible endpoint
    pub openai_api_key: String,
    /// Vision-capable model name
    #[serde(default = "default_vision_model")]
    pub openai_vision_model: String,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub openai_api_base: String,
    /// Timeout for one model HTTP call, in seconds
    #[serde(default = "default_llm_http_timeout_secs")]
    pub llm_http_timeout_secs: u64,
    /// Completion token limit
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,
}

fn default_vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

const fn default_llm_http_timeout_secs() -> u64 {
    DEFAULT_LLM_HTTP_TIMEOUT_SECS
}

const fn default_analysis_max_tokens() -> u32 {
    DEFAULT_ANALYSIS_MAX_TOKENS
}

const fn default_analysis_temperature() -> f32 {
    DEFAULT_ANALYSIS_TEMPERATURE
}

impl AnalysisSettings {
    /// Load settings from config files and the environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use plantid_core::config::AnalysisSettings;
    ///
    /// let settings = AnalysisSettings::new().expect("OPENAI_API_KEY must be set");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `OPENAI_API_KEY` is missing.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Settings with the given key and every other field at its default.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: api_key.into(),
            openai_vision_model: default_vision_model(),
            openai_api_base: default_api_base(),
            llm_http_timeout_secs: DEFAULT_LLM_HTTP_TIMEOUT_SECS,
            analysis_max_tokens: DEFAULT_ANALYSIS_MAX_TOKENS,
            analysis_temperature: DEFAULT_ANALYSIS_TEMPERATURE,
        }
    }
}
