//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::{ClientOptions, DEFAULT_BASE_URL};
use crate::credentials::{ProjectKey, SecretKey};
use crate::error::ClientError;

/// Secrets file locations, checked in order.
const SECRET_PATHS: [&str; 2] = [".secrets/qonversion.json", "../.secrets/qonversion.json"];

/// Configuration needed to build a [`QonversionClient`](crate::QonversionClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project key.
    pub project_key: ProjectKey,
    /// Secret key.
    pub secret_key: SecretKey,
    /// API origin override.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// Qonversion secrets file structure.
#[derive(Debug, Deserialize)]
struct QonversionSecrets {
    project_key: String,
    secret_key: String,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl From<QonversionSecrets> for ClientConfig {
    fn from(secrets: QonversionSecrets) -> Self {
        Self {
            project_key: ProjectKey::new(secrets.project_key),
            secret_key: SecretKey::new(secrets.secret_key),
            base_url: secrets.api_url,
            timeout_seconds: secrets.timeout_seconds,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a secrets file or environment variables.
    ///
    /// The first existing file among `.secrets/qonversion.json` and
    /// `../.secrets/qonversion.json` wins. Otherwise `QONVERSION_PROJECT_KEY`,
    /// `QONVERSION_SECRET_KEY`, `QONVERSION_API_URL`, and
    /// `QONVERSION_TIMEOUT_SECONDS` are read.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if a secrets file is unreadable or either
    /// key is missing.
    pub fn from_env() -> Result<Self, ClientError> {
        for path in SECRET_PATHS {
            if Path::new(path).exists() {
                let config = Self::from_secrets_file(path)?;
                tracing::info!(path = %path, "Loaded Qonversion secrets from file");
                return Ok(config);
            }
        }

        tracing::debug!("Qonversion secrets file not found, using environment variables");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from a JSON secrets file.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the file cannot be read or parsed.
    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let secrets: QonversionSecrets = serde_json::from_str(&contents).map_err(|e| {
            ClientError::Configuration(format!("invalid secrets file {}: {e}", path.display()))
        })?;
        Ok(secrets.into())
    }

    /// Build configuration from a variable lookup function.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClientError::Configuration(format!("{name} is not set")))
        };

        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let timeout_seconds = optional("QONVERSION_TIMEOUT_SECONDS")
            .map(|s| {
                s.parse::<u64>().map_err(|e| {
                    ClientError::Configuration(format!(
                        "QONVERSION_TIMEOUT_SECONDS is not a number: {s:?} ({e})"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            project_key: ProjectKey::new(required("QONVERSION_PROJECT_KEY")?),
            secret_key: SecretKey::new(required("QONVERSION_SECRET_KEY")?),
            base_url: optional("QONVERSION_API_URL"),
            timeout_seconds,
        })
    }

    /// Client options described by this configuration.
    #[must_use]
    pub fn options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout_seconds.map(Duration::from_secs),
            ..ClientOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::credentials::Credential;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_keys() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("QONVERSION_PROJECT_KEY", "pk"),
            ("QONVERSION_SECRET_KEY", "sk"),
            ("QONVERSION_TIMEOUT_SECONDS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.project_key.bearer(), "pk");
        assert_eq!(config.secret_key.bearer(), "sk");

        let options = config.options();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn from_lookup_requires_both_keys() {
        let err = ClientConfig::from_lookup(lookup(&[("QONVERSION_PROJECT_KEY", "pk")]))
            .unwrap_err();
        assert!(err.to_string().contains("QONVERSION_SECRET_KEY"));

        let err = ClientConfig::from_lookup(lookup(&[
            ("QONVERSION_PROJECT_KEY", ""),
            ("QONVERSION_SECRET_KEY", "sk"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("QONVERSION_PROJECT_KEY"));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("QONVERSION_PROJECT_KEY", "pk"),
            ("QONVERSION_SECRET_KEY", "sk"),
            ("QONVERSION_TIMEOUT_SECONDS", "30s"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("QONVERSION_TIMEOUT_SECONDS"));
    }

    #[test]
    fn from_lookup_treats_empty_optionals_as_unset() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("QONVERSION_PROJECT_KEY", "pk"),
            ("QONVERSION_SECRET_KEY", "sk"),
            ("QONVERSION_API_URL", ""),
            ("QONVERSION_TIMEOUT_SECONDS", ""),
        ]))
        .unwrap();

        assert!(config.base_url.is_none());
        assert!(config.timeout_seconds.is_none());
        assert_eq!(config.options().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn from_secrets_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"project_key": "pk-file", "secret_key": "sk-file", "api_url": "http://localhost:9000/v3"}}"#
        )
        .unwrap();

        let config = ClientConfig::from_secrets_file(file.path()).unwrap();
        assert_eq!(config.project_key.bearer(), "pk-file");
        assert_eq!(config.options().base_url, "http://localhost:9000/v3");
        assert!(config.options().timeout.is_none());
    }

    #[test]
    fn from_secrets_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ClientConfig::from_secrets_file(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
