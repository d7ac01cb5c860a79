use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub ollama_url: String,
    pub generation_model: String,
    pub gateway_timeout: Duration,
    pub sessions_dir: PathBuf,
    pub prompts_path: Option<PathBuf>,
    pub tts_url: Option<String>,
    pub stt_url: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5002".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let ollama_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());

        let generation_model =
            std::env::var("GENERATION_MODEL").unwrap_or_else(|_| "llama3.2".to_string());

        let timeout_str =
            std::env::var("GATEWAY_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "GATEWAY_TIMEOUT_SECS".to_string(),
                format!("'{timeout_str}' is not a number of seconds"),
            )
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_TIMEOUT_SECS".to_string(),
                "timeout must be at least one second".to_string(),
            ));
        }

        let sessions_dir = std::env::var("SESSIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./sessions"));

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);
        let tts_url = std::env::var("TTS_URL").ok();
        let stt_url = std::env::var("STT_URL").ok();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            ollama_url,
            generation_model,
            gateway_timeout: Duration::from_secs(timeout_secs),
            sessions_dir,
            prompts_path,
            tts_url,
            stt_url,
            log_level,
        })
    }
}
