//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use study_assistant_core::prompts::DEFAULT_MAX_CONTEXT_CHARS;
use study_assistant_core::RetryPolicy;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub chat_model: String,
    pub chat_max_tokens: Option<u32>,
    /// `None` disables the context cap.
    pub max_context_chars: Option<usize>,
    pub generation_max_attempts: u32,
    pub generation_backoff: Duration,
    pub tesseract_path: PathBuf,
    pub ocr_language: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    /// Tutoring sessions idle for longer than this are dropped. `None` keeps them forever.
    pub session_idle_ttl: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds the configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = EnvVars(&vars);

        // --- Server Settings ---
        let bind_address = env.parse_or("BIND_ADDRESS", "0.0.0.0:3000".parse::<SocketAddr>())?;

        let log_level_str = env.get("RUST_LOG").unwrap_or("INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let max_upload_bytes = env.parse_or::<usize>("MAX_UPLOAD_BYTES", Ok(10 * 1024 * 1024))?;
        let cors_origin = env.get("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000")
            .to_string();

        let session_idle_ttl = match env.parse_or::<u64>("SESSION_IDLE_TTL_SECS", Ok(60 * 60))? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        // --- Completion Endpoint Settings ---
        let openai_api_key = env.get("OPENAI_API_KEY").map(str::to_string);
        let openai_base_url = env.get("OPENAI_BASE_URL").map(str::to_string);
        let chat_model = env.get("CHAT_MODEL").unwrap_or("gpt-4o-mini").to_string();
        let chat_max_tokens = env.get("CHAT_MAX_TOKENS")
            .map(|v| parse_value::<u32>("CHAT_MAX_TOKENS", v))
            .transpose()?;

        let max_context_chars = match env.parse_or("MAX_CONTEXT_CHARS", Ok(DEFAULT_MAX_CONTEXT_CHARS))? {
            0 => None,
            limit => Some(limit),
        };

        let defaults = RetryPolicy::default();
        let generation_max_attempts =
            env.parse_or("GENERATION_MAX_ATTEMPTS", Ok(defaults.max_attempts))?;
        if generation_max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let generation_backoff = Duration::from_millis(env.parse_or(
            "GENERATION_BACKOFF_MS",
            Ok(defaults.initial_backoff.as_millis() as u64),
        )?);

        // --- OCR Settings ---
        let tesseract_path = PathBuf::from(env.get("TESSERACT_PATH").unwrap_or("tesseract"));
        let ocr_language = env.get("OCR_LANGUAGE").unwrap_or("eng").to_string();

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            openai_base_url,
            chat_model,
            chat_max_tokens,
            max_context_chars,
            generation_max_attempts,
            generation_backoff,
            tesseract_path,
            ocr_language,
            max_upload_bytes,
            cors_origin,
            session_idle_ttl,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.generation_max_attempts,
            initial_backoff: self.generation_backoff,
        }
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

/// Read-only view over the variables, treating blank values as unset.
struct EnvVars<'a>(&'a HashMap<String, String>);

impl<'a> EnvVars<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parses `name` when set, otherwise falls back to `default`.
    fn parse_or<T>(&self, name: &str, default: Result<T, T::Err>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(value) => parse_value(name, value),
            None => default.map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        }
    }
}
