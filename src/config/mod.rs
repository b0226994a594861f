//! Configuration loading for the outreach connectors.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `OUTREACH_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::connectors::{anymailfinder, smartlead};

/// Prefix of every recognised environment variable.
pub const ENV_PREFIX: &str = "OUTREACH_";

const REDACTED: &str = "[REDACTED]";

/// Application configuration derived from `OUTREACH_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anymailfinder_api_key: Option<String>,
    #[serde(default = "default_anymailfinder_base_url")]
    pub anymailfinder_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smartlead_api_key: Option<String>,
    #[serde(default = "default_smartlead_base_url")]
    pub smartlead_base_url: String,
    /// Timeout applied to requests that do not set their own
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Record per-item failures as `{error}` output instead of aborting
    #[serde(default)]
    pub continue_on_fail: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            anymailfinder_api_key: None,
            anymailfinder_base_url: default_anymailfinder_base_url(),
            smartlead_api_key: None,
            smartlead_base_url: default_smartlead_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            continue_on_fail: false,
        }
    }
}

impl AppConfig {
    /// Returns a redacted JSON representation (API keys are masked).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.anymailfinder_api_key.is_some() {
            config.anymailfinder_api_key = Some(REDACTED.to_string());
        }
        if config.smartlead_api_key.is_some() {
            config.smartlead_api_key = Some(REDACTED.to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("ANYMAILFINDER_BASE_URL", &self.anymailfinder_base_url),
            ("SMARTLEAD_BASE_URL", &self.smartlead_base_url),
        ] {
            if let Err(source) = Url::parse(value) {
                return Err(ConfigError::InvalidBaseUrl {
                    name,
                    value: value.clone(),
                    source,
                });
            }
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidRequestTimeout {
                value: self.request_timeout_secs,
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_anymailfinder_base_url() -> String {
    anymailfinder::DEFAULT_BASE_URL.to_string()
}

fn default_smartlead_base_url() -> String {
    smartlead::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid {name} '{value}': {source}")]
    InvalidBaseUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("request timeout must be positive, got {value}")]
    InvalidRequestTimeout { value: u64 },
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Loads configuration using layered `.env` files and `OUTREACH_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.<profile>` and `.env.<profile>.local`
    /// in that order, then overlays the process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let log_level = take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_string(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let anymailfinder_api_key = take_secret(&mut layered, "ANYMAILFINDER_API_KEY");
        let anymailfinder_base_url = take_string(&mut layered, "ANYMAILFINDER_BASE_URL")
            .unwrap_or_else(default_anymailfinder_base_url);
        let smartlead_api_key = take_secret(&mut layered, "SMARTLEAD_API_KEY");
        let smartlead_base_url = take_string(&mut layered, "SMARTLEAD_BASE_URL")
            .unwrap_or_else(default_smartlead_base_url);

        let request_timeout_secs = match take_string(&mut layered, "REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: format!("{ENV_PREFIX}REQUEST_TIMEOUT_SECS"),
                    value: raw.clone(),
                    expected: "a whole number of seconds",
                })?,
            None => default_request_timeout_secs(),
        };

        let continue_on_fail = match take_string(&mut layered, "CONTINUE_ON_FAIL") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: format!("{ENV_PREFIX}CONTINUE_ON_FAIL"),
                value: raw.clone(),
                expected: "true or false",
            })?,
            None => false,
        };

        let config = AppConfig {
            profile,
            log_level,
            log_format,
            anymailfinder_api_key,
            anymailfinder_base_url,
            smartlead_api_key,
            smartlead_base_url,
            request_timeout_secs,
            continue_on_fail,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values.remove(key).filter(|v| !v.is_empty())
}

fn take_secret(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.anymailfinder_base_url, "https://api.anymailfinder.com");
        assert_eq!(config.smartlead_base_url, "https://server.smartlead.ai/api/v1");
        assert!(!config.continue_on_fail);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = AppConfig {
            smartlead_base_url: "server.smartlead.ai".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            bad_url.validate(),
            Err(ConfigError::InvalidBaseUrl {
                name: "SMARTLEAD_BASE_URL",
                ..
            })
        ));

        let bad_format = AppConfig {
            log_format: "xml".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            bad_format.validate(),
            Err(ConfigError::InvalidLogFormat { .. })
        ));

        let zero_timeout = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_redacted_json_masks_api_keys() {
        let config = AppConfig {
            anymailfinder_api_key: Some("amf-secret".to_string()),
            smartlead_api_key: Some("sl-secret".to_string()),
            ..AppConfig::default()
        };
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("amf-secret"));
        assert!(!json.contains("sl-secret"));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
