use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tutor_core::llm_client::GEMINI_OPENAI_BASE;

use crate::StateLimits;

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
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub agent_name: String,
    pub agent_seed: String,
    pub prompts_path: Option<PathBuf>,
    pub mailbox_capacity: usize,
    pub mailbox_max_addresses: usize,
    pub max_open_sessions: usize,
    pub generation_timeout: Duration,
    pub log_level: Level,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_limit(name: &str, default: usize) -> Result<usize, ConfigError> {
    let value = parse_var(name, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

impl Config {
    pub fn state_limits(&self) -> StateLimits {
        StateLimits {
            mailbox_capacity: self.mailbox_capacity,
            mailbox_max_addresses: self.mailbox_max_addresses,
            max_open_sessions: self.max_open_sessions,
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GOOGLE_API_KEY".to_string()))?;

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let gemini_api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_OPENAI_BASE.to_string());

        let agent_name = std::env::var("AGENT_NAME").unwrap_or_else(|_| "Tutor Agent".to_string());
        let agent_seed = std::env::var("AGENT_SEED")
            .unwrap_or_else(|_| "tutor_chat_agent_secret_phrase".to_string());

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let mailbox_capacity = parse_limit("MAILBOX_CAPACITY", 256)?;
        let mailbox_max_addresses = parse_limit("MAILBOX_MAX_ADDRESSES", 1024)?;
        let max_open_sessions = parse_limit("MAX_OPEN_SESSIONS", 1024)?;

        let generation_timeout = Duration::from_secs(parse_var("GENERATION_TIMEOUT_SECS", 60u64)?);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            google_api_key,
            gemini_model,
            gemini_api_base,
            agent_name,
            agent_seed,
            prompts_path,
            mailbox_capacity,
            mailbox_max_addresses,
            max_open_sessions,
            generation_timeout,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("GOOGLE_API_KEY");
            env::remove_var("GEMINI_MODEL");
            env::remove_var("GEMINI_API_BASE");
            env::remove_var("AGENT_NAME");
            env::remove_var("AGENT_SEED");
            env::remove_var("PROMPTS_PATH");
            env::remove_var("MAILBOX_CAPACITY");
            env::remove_var("MAILBOX_MAX_ADDRESSES");
            env::remove_var("MAX_OPEN_SESSIONS");
            env::remove_var("GENERATION_TIMEOUT_SECS");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "test-google-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:8000");
        assert_eq!(config.google_api_key, "test-google-key");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_api_base, GEMINI_OPENAI_BASE);
        assert_eq!(config.agent_name, "Tutor Agent");
        assert_eq!(config.agent_seed, "tutor_chat_agent_secret_phrase");
        assert_eq!(config.prompts_path, None);
        assert_eq!(config.mailbox_capacity, 256);
        assert_eq!(config.mailbox_max_addresses, 1024);
        assert_eq!(config.max_open_sessions, 1024);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:9000");
            env::set_var("GOOGLE_API_KEY", "custom-key");
            env::set_var("GEMINI_MODEL", "gemini-2.0-flash");
            env::set_var("GEMINI_API_BASE", "http://localhost:8081/v1");
            env::set_var("AGENT_NAME", "Night Tutor");
            env::set_var("AGENT_SEED", "another seed");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
            env::set_var("MAILBOX_CAPACITY", "16");
            env::set_var("MAILBOX_MAX_ADDRESSES", "32");
            env::set_var("MAX_OPEN_SESSIONS", "64");
            env::set_var("GENERATION_TIMEOUT_SECS", "5");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:9000");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_api_base, "http://localhost:8081/v1");
        assert_eq!(config.agent_name, "Night Tutor");
        assert_eq!(config.agent_seed, "another seed");
        assert_eq!(config.prompts_path, Some(PathBuf::from("/custom/prompts")));
        assert_eq!(config.mailbox_capacity, 16);
        assert_eq!(config.mailbox_max_addresses, 32);
        assert_eq!(config.max_open_sessions, 64);
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_missing_google_key() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("GOOGLE_API_KEY")),
            _ => panic!("Expected MissingVar for GOOGLE_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_blank_google_key_is_missing() {
        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "  ");
        }

        assert!(matches!(
            Config::from_env().unwrap_err(),
            ConfigError::MissingVar(_)
        ));
    }

    #[test]
    #[serial]
    fn test_config_invalid_values() {
        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "key");
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }

        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "key");
            env::set_var("MAILBOX_CAPACITY", "0");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAILBOX_CAPACITY"),
            _ => panic!("Expected InvalidValue for MAILBOX_CAPACITY"),
        }

        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "key");
            env::set_var("MAX_OPEN_SESSIONS", "0");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_OPEN_SESSIONS"),
            _ => panic!("Expected InvalidValue for MAX_OPEN_SESSIONS"),
        }

        clear_env_vars();
        unsafe {
            env::set_var("GOOGLE_API_KEY", "key");
            env::set_var("RUST_LOG", "not-a-level");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }
}
