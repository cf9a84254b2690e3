//! Centralized configuration for the Heartview client.
//!
//! Network constants live in const structs; endpoint/base-URL settings are
//! resolved from environment variables so deployments can point the client
//! at their own backend and identity project.

use crate::error::{HeartviewError, Result};
use std::time::Duration;
use url::Url;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "heartview-client/0.2";
    /// Treat a session as expired this long before its real expiry so a
    /// request never leaves with a token that dies in flight.
    pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(60);
}

/// Shared directory and file name configuration.
pub struct PathsConfig;

impl PathsConfig {
    pub const CONFIG_DIR_NAME: &'static str = "heartview";
    pub const SESSION_FILENAME: &'static str = "session.json";
}

/// Environment variable names read by [`Settings::from_env`].
pub struct EnvVars;

impl EnvVars {
    pub const API_BASE: &'static str = "HEARTVIEW_API_BASE";
    pub const IDENTITY_BASE: &'static str = "HEARTVIEW_IDENTITY_BASE";
    pub const TOKEN_BASE: &'static str = "HEARTVIEW_TOKEN_BASE";
    pub const FIRESTORE_BASE: &'static str = "HEARTVIEW_FIRESTORE_BASE";
    pub const API_KEY: &'static str = "HEARTVIEW_API_KEY";
    pub const PROJECT_ID: &'static str = "HEARTVIEW_PROJECT_ID";
}

/// Default prediction backend during local development.
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
const DEFAULT_IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TOKEN_BASE: &str = "https://securetoken.googleapis.com";
const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com";

/// Resolved endpoint configuration for all external collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Prediction/history REST backend base URL.
    pub api_base: String,
    /// Identity provider REST base URL.
    pub identity_base: String,
    /// Token refresh service base URL.
    pub token_base: String,
    /// Document database REST base URL.
    pub firestore_base: String,
    /// Identity project API key, appended to identity requests.
    pub api_key: String,
    /// Document database project id.
    pub project_id: String,
}

impl Settings {
    /// Build settings with default endpoints for the given identity project.
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            identity_base: DEFAULT_IDENTITY_BASE.to_string(),
            token_base: DEFAULT_TOKEN_BASE.to_string(),
            firestore_base: DEFAULT_FIRESTORE_BASE.to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
        }
    }

    /// Resolve settings from the process environment.
    ///
    /// `HEARTVIEW_API_KEY` and `HEARTVIEW_PROJECT_ID` are required; the
    /// base URLs fall back to defaults. Fails hard on an incomplete
    /// identity configuration rather than limping along unauthenticated.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve settings through a variable lookup function.
    pub(crate) fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| HeartviewError::Config {
                    message: format!("Missing identity configuration: set {}", name),
                })
        };
        let with_default = |name: &str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let settings = Self {
            api_base: trim_base(&with_default(EnvVars::API_BASE, DEFAULT_API_BASE)),
            identity_base: trim_base(&with_default(EnvVars::IDENTITY_BASE, DEFAULT_IDENTITY_BASE)),
            token_base: trim_base(&with_default(EnvVars::TOKEN_BASE, DEFAULT_TOKEN_BASE)),
            firestore_base: trim_base(&with_default(
                EnvVars::FIRESTORE_BASE,
                DEFAULT_FIRESTORE_BASE,
            )),
            api_key: required(EnvVars::API_KEY)?,
            project_id: required(EnvVars::PROJECT_ID)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every base URL actually parses as one.
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [
            (EnvVars::API_BASE, &self.api_base),
            (EnvVars::IDENTITY_BASE, &self.identity_base),
            (EnvVars::TOKEN_BASE, &self.token_base),
            (EnvVars::FIRESTORE_BASE, &self.firestore_base),
        ] {
            Url::parse(base).map_err(|e| HeartviewError::Config {
                message: format!("Invalid {}: {} ({})", name, base, e),
            })?;
        }
        Ok(())
    }
}

/// Normalize a base URL so joining with `/path` never doubles a slash.
fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_requires_api_key_and_project() {
        let vars = env_with(&[("HEARTVIEW_API_KEY", "key-123")]);
        let result = Settings::resolve(|name| vars.get(name).cloned());
        assert!(result.is_err());
        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("HEARTVIEW_PROJECT_ID"));
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let vars = env_with(&[
            ("HEARTVIEW_API_KEY", "key-123"),
            ("HEARTVIEW_PROJECT_ID", "heartview-dev"),
        ]);
        let settings = Settings::resolve(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(settings.api_base, "http://127.0.0.1:8000");
        assert_eq!(settings.identity_base, "https://identitytoolkit.googleapis.com");
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let vars = env_with(&[
            ("HEARTVIEW_API_KEY", "key-123"),
            ("HEARTVIEW_PROJECT_ID", "heartview-dev"),
            ("HEARTVIEW_API_BASE", "https://api.example.com/"),
        ]);
        let settings = Settings::resolve(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(settings.api_base, "https://api.example.com");
    }

    #[test]
    fn test_resolve_rejects_unparseable_base() {
        let vars = env_with(&[
            ("HEARTVIEW_API_KEY", "key-123"),
            ("HEARTVIEW_PROJECT_ID", "heartview-dev"),
            ("HEARTVIEW_API_BASE", "not a url"),
        ]);
        assert!(Settings::resolve(|name| vars.get(name).cloned()).is_err());
    }

    #[test]
    fn test_timeouts_are_reasonable() {
        assert!(NetworkConfig::REQUEST_TIMEOUT > Duration::ZERO);
        assert!(NetworkConfig::TOKEN_EXPIRY_SKEW < NetworkConfig::REQUEST_TIMEOUT * 100);
    }
}
