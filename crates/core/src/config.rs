//! Configuration management for the Deskbot CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (deskbot.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Providers the factory knows how to construct.
const KNOWN_PROVIDERS: &[&str] = &["perplexity"];

/// Main application configuration.
///
/// This struct holds all global options that affect CLI behavior across
/// commands, including the generation-provider settings shared by the
/// orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Company name injected into the system context
    pub company_name: String,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider (e.g., "perplexity")
    pub provider: String,

    /// Model identifier sent in the provider payload
    pub model: String,

    /// Model label reported back to callers in reply payloads.
    ///
    /// The dispatched model and the reported label are configured
    /// independently; they default to "sonar" and "sonar-pro" respectively
    /// and may legitimately differ.
    pub reported_model: String,

    /// Optional custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for the provider (usually resolved from the environment)
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Maximum tokens to request from the provider
    pub max_tokens: u32,

    /// Sampling temperature for generation
    pub temperature: f32,

    /// Hard timeout for a provider call, in seconds
    pub timeout_secs: u64,

    /// Path to the SQLite database file
    pub database: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    company: Option<String>,
    database: Option<String>,
    provider: Option<ProviderSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderSection {
    name: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    model: Option<String>,
    #[serde(rename = "reportedModel")]
    reported_model: Option<String>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            company_name: "Ankit Solutions".to_string(),
            config_file: None,
            provider: "perplexity".to_string(),
            model: "sonar".to_string(),
            reported_model: "sonar-pro".to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: "PERPLEXITY_API_KEY".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
            database: PathBuf::from("deskbot.db"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `DESKBOT_CONFIG`: Path to config file
    /// - `DESKBOT_PROVIDER`: Generation provider
    /// - `DESKBOT_MODEL`: Model identifier
    /// - `DESKBOT_API_KEY`: API key
    /// - `DESKBOT_DB`: Database path
    /// - `COMPANY_NAME`: Company name for the system context
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("DESKBOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            PathBuf::from("deskbot.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(company) = std::env::var("COMPANY_NAME") {
            config.company_name = company;
        }

        if let Ok(provider) = std::env::var("DESKBOT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DESKBOT_MODEL") {
            config.model = model;
        }

        if let Ok(db) = std::env::var("DESKBOT_DB") {
            config.database = PathBuf::from(db);
        }

        config.api_key = std::env::var("DESKBOT_API_KEY").ok();

        // Only override the YAML logging level when RUST_LOG is actually set
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            config.log_level = Some(log_level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(company) = config_file.company {
            result.company_name = company;
        }

        if let Some(database) = config_file.database {
            result.database = PathBuf::from(database);
        }

        if let Some(provider) = config_file.provider {
            if let Some(name) = provider.name {
                result.provider = name;
            }
            if provider.endpoint.is_some() {
                result.endpoint = provider.endpoint;
            }
            if let Some(env) = provider.api_key_env {
                result.api_key_env = env;
            }
            if let Some(model) = provider.model {
                result.model = model;
            }
            if let Some(reported) = provider.reported_model {
                result.reported_model = reported;
            }
            if let Some(max_tokens) = provider.max_tokens {
                result.max_tokens = max_tokens;
            }
            if let Some(temperature) = provider.temperature {
                result.temperature = temperature;
            }
            if let Some(timeout) = provider.timeout_secs {
                result.timeout_secs = timeout;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        database: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(database) = database {
            self.database = database;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the provider API key.
    ///
    /// An explicitly supplied key wins; otherwise the configured environment
    /// variable is consulted.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env).ok()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "perplexity");
        assert_eq!(config.model, "sonar");
        assert_eq!(config.reported_model, "sonar-pro");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("perplexity".to_string()),
            Some("sonar-pro".to_string()),
            Some(PathBuf::from("/tmp/chat.db")),
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "sonar-pro");
        assert_eq!(overridden.database, PathBuf::from("/tmp/chat.db"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_perplexity() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_keeps_yaml_log_level_without_rust_log() {
        let dir = std::env::temp_dir().join("deskbot-config-load-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deskbot.yaml");
        std::fs::write(&path, "logging:\n  level: debug\n").unwrap();

        std::env::remove_var("RUST_LOG");
        std::env::set_var("DESKBOT_CONFIG", &path);

        let config = AppConfig::load().unwrap();
        std::env::remove_var("DESKBOT_CONFIG");

        // An unset RUST_LOG must not reset the level configured in YAML
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let yaml = r#"
company: Acme Corp
database: acme.db
provider:
  name: perplexity
  model: sonar
  reportedModel: sonar-pro
  maxTokens: 256
  temperature: 0.2
  timeoutSecs: 10
logging:
  level: debug
  color: false
"#;
        let dir = std::env::temp_dir().join("deskbot-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deskbot.yaml");
        std::fs::write(&path, yaml).unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.company_name, "Acme Corp");
        assert_eq!(merged.database, PathBuf::from("acme.db"));
        assert_eq!(merged.max_tokens, 256);
        assert_eq!(merged.timeout_secs, 10);
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.no_color);
    }
}
