//! Process-wide configuration.
//!
//! Loaded once from the environment at startup (after `.env`, if present)
//! and read-only afterward. Per-request credential overrides are applied by
//! [`AppConfig::resolve_credentials`]: override, then process default, then
//! a configuration error.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quizgen_core::{ResponseFormat, MAX_SOURCE_CHARS};
use thiserror::Error;

const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_PORT: u16 = 7861;
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("missing {what}: supply {field} or set {env}")]
    MissingCredentials {
        what: &'static str,
        field: &'static str,
        env: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub llm_api_key: Option<String>,
    pub llm_api_base: Option<String>,
    pub llm_model: String,
    pub llm_vision_model: String,
    pub llm_timeout: Duration,
    pub max_source_chars: usize,
    pub response_format: ResponseFormat,
    pub export_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Optional per-request credential overrides.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Credentials a completion provider is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmCredentials {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub vision_model: String,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).and_then(non_blank);

        let llm_model = var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let llm_vision_model = var("LLM_VISION_MODEL").unwrap_or_else(|| llm_model.clone());

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var("PORT", var("PORT"), DEFAULT_PORT)?,
            llm_api_key: var("OPENAI_API_KEY"),
            llm_api_base: var("OPENAI_API_BASE"),
            llm_model,
            llm_vision_model,
            llm_timeout: Duration::from_secs(parse_var(
                "LLM_TIMEOUT_SECS",
                var("LLM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_source_chars: parse_var("MAX_SOURCE_CHARS", var("MAX_SOURCE_CHARS"), MAX_SOURCE_CHARS)?,
            response_format: parse_var(
                "RESPONSE_FORMAT",
                var("RESPONSE_FORMAT"),
                ResponseFormat::default(),
            )?,
            export_dir: var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: parse_var(
                "MAX_UPLOAD_BYTES",
                var("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the credentials for one request.
    pub fn resolve_credentials(
        &self,
        overrides: &CredentialOverrides,
    ) -> Result<LlmCredentials, ConfigError> {
        let api_key = pick(&overrides.api_key, &self.llm_api_key).ok_or(
            ConfigError::MissingCredentials {
                what: "LLM API key",
                field: "llm_key",
                env: "OPENAI_API_KEY",
            },
        )?;
        let base_url = pick(&overrides.base_url, &self.llm_api_base).ok_or(
            ConfigError::MissingCredentials {
                what: "LLM base URL",
                field: "baseurl",
                env: "OPENAI_API_BASE",
            },
        )?;
        let model = overrides
            .model
            .clone()
            .and_then(non_blank)
            .unwrap_or_else(|| self.llm_model.clone());

        Ok(LlmCredentials {
            api_key,
            base_url,
            model,
            vision_model: self.llm_vision_model.clone(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            llm_api_key: None,
            llm_api_base: None,
            llm_model: DEFAULT_MODEL.to_string(),
            llm_vision_model: DEFAULT_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_source_chars: MAX_SOURCE_CHARS,
            response_format: ResponseFormat::default(),
            export_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn pick(preferred: &Option<String>, fallback: &Option<String>) -> Option<String> {
    preferred
        .clone()
        .and_then(non_blank)
        .or_else(|| fallback.clone().and_then(non_blank))
}

fn parse_var<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 7861);
        assert_eq!(config.llm_model, "gpt-4.1");
        assert_eq!(config.llm_vision_model, "gpt-4.1");
        assert_eq!(config.max_source_chars, 200_000);
        assert_eq!(config.response_format, ResponseFormat::Numbered);
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn reads_values() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:1234/v1"),
            ("LLM_MODEL", "gpt-4o-mini"),
            ("RESPONSE_FORMAT", "inline"),
            ("MAX_SOURCE_CHARS", "1000"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm_vision_model, "gpt-4o-mini");
        assert_eq!(config.response_format, ResponseFormat::Inline);
        assert_eq!(config.max_source_chars, 1000);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("OPENAI_API_KEY", "   "), ("PORT", "")]).unwrap();
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.port, 7861);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config_from(&[("RESPONSE_FORMAT", "yaml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RESPONSE_FORMAT", .. }));
    }

    #[test]
    fn override_beats_default() {
        let config = AppConfig {
            llm_api_key: Some("env-key".into()),
            llm_api_base: Some("http://env/v1".into()),
            ..AppConfig::default()
        };
        let creds = config
            .resolve_credentials(&CredentialOverrides {
                api_key: Some("request-key".into()),
                base_url: None,
                model: Some("gpt-4o".into()),
            })
            .unwrap();
        assert_eq!(creds.api_key, "request-key");
        assert_eq!(creds.base_url, "http://env/v1");
        assert_eq!(creds.model, "gpt-4o");
    }

    #[test]
    fn default_used_when_override_blank() {
        let config = AppConfig {
            llm_api_key: Some("env-key".into()),
            llm_api_base: Some("http://env/v1".into()),
            ..AppConfig::default()
        };
        let creds = config
            .resolve_credentials(&CredentialOverrides {
                api_key: Some("".into()),
                ..CredentialOverrides::default()
            })
            .unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.model, "gpt-4.1");
    }

    #[test]
    fn missing_credentials_fail() {
        let config = AppConfig::default();
        let err = config
            .resolve_credentials(&CredentialOverrides::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing LLM API key: supply llm_key or set OPENAI_API_KEY"
        );

        let err = config
            .resolve_credentials(&CredentialOverrides {
                api_key: Some("k".into()),
                ..CredentialOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { field: "baseurl", .. }));
    }
}
