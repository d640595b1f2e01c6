//! Configuration management for customer-intake
//!
//! Config file location:
//! - Linux: ~/.config/customer-intake/config.toml
//! - macOS: ~/Library/Application Support/customer-intake/config.toml
//! - Windows: %APPDATA%/customer-intake/config.toml
//!
//! You can override the config location by setting `CUSTOMER_INTAKE_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::form::Field;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Which fields are required
    #[serde(default)]
    pub form: FieldPolicy,

    /// Submission feedback behavior
    #[serde(default)]
    pub submission: SubmissionConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("CUSTOMER_INTAKE_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("com", "intake", "customer-intake")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<Self> {
        let config = Self::load()?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            config.save_to(&config_path)?;
        }

        Ok(config)
    }

    /// Apply `CUSTOMER_INTAKE_API_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var("CUSTOMER_INTAKE_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            self.api.base_url = url;
        }

        if let Some(timeout) = std::env::var("CUSTOMER_INTAKE_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            self.api.timeout_seconds = timeout;
        }

        if let Some(verify) = std::env::var("CUSTOMER_INTAKE_API_VERIFY_SSL")
            .ok()
            .and_then(|s| parse_bool_value(&s))
        {
            self.api.verify_ssl = verify;
        }

        self
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Path of the customer creation endpoint
    #[serde(default = "default_api_path")]
    pub path: String,

    /// API timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Whether to verify SSL certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            path: default_api_path(),
            timeout_seconds: default_timeout(),
            verify_ssl: default_true(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_api_path() -> String {
    "/api/customers".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Requirement flags for the individual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    #[serde(default)]
    pub require_middle_name: bool,

    #[serde(default)]
    pub require_egn: bool,

    #[serde(default = "default_true")]
    pub require_postcode: bool,

    #[serde(default)]
    pub require_phone: bool,

    #[serde(default)]
    pub require_email: bool,

    /// At least one of phone or email
    #[serde(default = "default_true")]
    pub require_contact: bool,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self {
            require_middle_name: false,
            require_egn: false,
            require_postcode: true,
            require_phone: false,
            require_email: false,
            require_contact: true,
        }
    }
}

impl FieldPolicy {
    pub fn is_required(&self, field: Field) -> bool {
        match field {
            Field::FirstName | Field::LastName | Field::Address => true,
            Field::MiddleName => self.require_middle_name,
            Field::NationalId => self.require_egn,
            Field::Postcode => self.require_postcode,
            Field::PhoneNumber => self.require_phone,
            Field::EmailAddress => self.require_email,
        }
    }
}

fn default_success_display_ms() -> u64 {
    3000
}

/// Submission feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// How long the success confirmation stays up before returning to idle
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            success_display_ms: default_success_display_ms(),
        }
    }
}

impl SubmissionConfig {
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

pub(crate) fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:4000");
        assert_eq!(config.api.path, "/api/customers");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.api.verify_ssl);
        assert_eq!(config.submission.success_display_ms, 3000);
        assert_eq!(config.form, FieldPolicy::default());
    }

    #[test]
    fn test_default_policy_matches_form_rules() {
        let policy = FieldPolicy::default();
        assert!(policy.is_required(Field::FirstName));
        assert!(policy.is_required(Field::LastName));
        assert!(policy.is_required(Field::Address));
        assert!(policy.is_required(Field::Postcode));
        assert!(!policy.is_required(Field::MiddleName));
        assert!(!policy.is_required(Field::NationalId));
        assert!(!policy.is_required(Field::PhoneNumber));
        assert!(!policy.is_required(Field::EmailAddress));
        assert!(policy.require_contact);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();

        assert!(toml.contains("base_url"));
        assert!(toml.contains("timeout_seconds"));
        assert!(toml.contains("[form]"));
        assert!(toml.contains("require_contact"));
        assert!(toml.contains("success_display_ms"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[api]\nbase_url = \"https://crm.example.com\"\n\n[form]\nrequire_egn = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://crm.example.com");
        assert_eq!(config.api.path, "/api/customers");
        assert!(config.form.require_egn);
        assert!(config.form.require_postcode);
        assert!(config.form.require_contact);
        assert_eq!(config.submission.success_display_ms, 3000);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:4000");
    }

    #[test]
    fn test_save_round_trip_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.submission.success_display_ms = 500;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.submission.success_display_ms, 500);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool_value("true"), Some(true));
        assert_eq!(parse_bool_value("1"), Some(true));
        assert_eq!(parse_bool_value("no"), Some(false));
        assert_eq!(parse_bool_value("0"), Some(false));
        assert_eq!(parse_bool_value("maybe"), None);
    }
}
