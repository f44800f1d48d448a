//! Marketplace connection settings.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::{Result, TurkError};

/// Production marketplace API host.
pub const PRODUCTION_HOST: &str = "mechanicalturk.amazonaws.com";
/// Sandbox marketplace API host.
pub const SANDBOX_HOST: &str = "mechanicalturk.sandbox.amazonaws.com";

/// Worker-facing site for production.
pub const PRODUCTION_WORKER_URL: &str = "https://www.mturk.com";
/// Worker-facing site for the sandbox.
pub const SANDBOX_WORKER_URL: &str = "https://workersandbox.mturk.com";

/// Marketplace settings, passed explicitly to whatever needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Host used outside debug mode
    #[serde(default)]
    pub host: Option<String>,

    /// Host used in debug mode
    #[serde(default)]
    pub sandbox_host: Option<String>,

    /// `Some(true)` selects `sandbox_host`, `Some(false)` selects `host`.
    /// Unset keeps the production host.
    #[serde(default)]
    pub debug: Option<bool>,

    /// Public base URL of this application
    #[serde(default)]
    pub app_url: Option<String>,

    /// Directory holding per-battery credentials files
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,

    /// Height of the task frame, in pixels
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
}

fn default_credentials_dir() -> PathBuf {
    PathBuf::from("auth")
}

fn default_frame_height() -> u32 {
    900
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            host: None,
            sandbox_host: None,
            debug: None,
            app_url: None,
            credentials_dir: default_credentials_dir(),
            frame_height: default_frame_height(),
        }
    }
}

/// A validated marketplace host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// The live marketplace
    Production,
    /// The testing sandbox
    Sandbox,
}

impl Host {
    /// API host name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Host::Production => PRODUCTION_HOST,
            Host::Sandbox => SANDBOX_HOST,
        }
    }

    /// Worker-facing site.
    pub fn worker_url(&self) -> &'static str {
        match self {
            Host::Production => PRODUCTION_WORKER_URL,
            Host::Sandbox => SANDBOX_WORKER_URL,
        }
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MarketplaceConfig {
    /// Sandbox settings with the given application URL.
    pub fn sandbox(app_url: impl Into<String>) -> Self {
        Self {
            sandbox_host: Some(SANDBOX_HOST.to_string()),
            debug: Some(true),
            app_url: Some(app_url.into()),
            ..Self::default()
        }
    }

    /// Resolve the configured host.
    ///
    /// Only an explicit `debug` setting consults the configured hosts: debug
    /// mode uses `sandbox_host`, non-debug mode uses `host`. Anything unset
    /// falls back to the production host. A URL scheme prefix is stripped, and
    /// anything other than the two known hosts is rejected.
    pub fn resolve_host(&self) -> Result<Host> {
        let configured = match self.debug {
            Some(true) => self.sandbox_host.as_deref(),
            Some(false) => self.host.as_deref(),
            None => None,
        };
        let host = configured.unwrap_or(PRODUCTION_HOST).trim();
        let host = host
            .strip_prefix("http://")
            .or_else(|| host.strip_prefix("https://"))
            .unwrap_or(host)
            .trim_end_matches('/');

        match host {
            PRODUCTION_HOST => Ok(Host::Production),
            SANDBOX_HOST => Ok(Host::Sandbox),
            other => Err(TurkError::InvalidSettings(format!(
                "host must be {PRODUCTION_HOST} or {SANDBOX_HOST}, got {other}"
            ))),
        }
    }

    /// Whether the settings point at the sandbox.
    pub fn is_sandbox(&self) -> Result<bool> {
        Ok(self.resolve_host()? == Host::Sandbox)
    }

    /// Worker-facing site matching the configured host.
    pub fn worker_url(&self) -> Result<&'static str> {
        Ok(self.resolve_host()?.worker_url())
    }

    /// Application base URL, without a trailing slash.
    pub fn app_url(&self) -> Result<&str> {
        self.app_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| TurkError::InvalidSettings("app_url is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = MarketplaceConfig::default();
        assert_eq!(config.resolve_host().unwrap(), Host::Production);
        assert!(!config.is_sandbox().unwrap());
        assert_eq!(config.worker_url().unwrap(), PRODUCTION_WORKER_URL);
    }

    #[test]
    fn test_debug_uses_sandbox_host() {
        let config = MarketplaceConfig::sandbox("https://expfactory.example.org");
        assert_eq!(config.resolve_host().unwrap(), Host::Sandbox);
        assert_eq!(config.worker_url().unwrap(), SANDBOX_WORKER_URL);
    }

    #[test]
    fn test_debug_ignores_production_host_setting() {
        let config = MarketplaceConfig {
            host: Some(SANDBOX_HOST.to_string()),
            debug: Some(true),
            ..MarketplaceConfig::default()
        };
        // No sandbox_host configured: falls back to production.
        assert_eq!(config.resolve_host().unwrap(), Host::Production);
    }

    #[test]
    fn test_host_ignored_without_debug_setting() {
        let config = MarketplaceConfig {
            host: Some(SANDBOX_HOST.to_string()),
            sandbox_host: Some(SANDBOX_HOST.to_string()),
            ..MarketplaceConfig::default()
        };
        assert_eq!(config.resolve_host().unwrap(), Host::Production);

        let config = MarketplaceConfig {
            host: Some("evil.example.com".to_string()),
            ..MarketplaceConfig::default()
        };
        assert_eq!(config.resolve_host().unwrap(), Host::Production);
    }

    #[test]
    fn test_non_debug_uses_host() {
        let config: MarketplaceConfig =
            serde_json::from_str(&format!(r#"{{"debug": false, "host": "{SANDBOX_HOST}"}}"#)).unwrap();
        assert_eq!(config.resolve_host().unwrap(), Host::Sandbox);
    }

    #[test]
    fn test_scheme_prefix_stripped() {
        let config = MarketplaceConfig {
            host: Some(format!("https://{SANDBOX_HOST}")),
            debug: Some(false),
            ..MarketplaceConfig::default()
        };
        assert!(config.is_sandbox().unwrap());

        let config = MarketplaceConfig {
            host: Some(format!("http://{PRODUCTION_HOST}/")),
            debug: Some(false),
            ..MarketplaceConfig::default()
        };
        assert_eq!(config.resolve_host().unwrap(), Host::Production);
    }

    #[test]
    fn test_unknown_host_rejected() {
        let config = MarketplaceConfig {
            host: Some("evil.example.com".to_string()),
            debug: Some(false),
            ..MarketplaceConfig::default()
        };
        assert!(matches!(config.resolve_host(), Err(TurkError::InvalidSettings(_))));
    }

    #[test]
    fn test_app_url() {
        let config = MarketplaceConfig::sandbox("https://expfactory.example.org/");
        assert_eq!(config.app_url().unwrap(), "https://expfactory.example.org");
        assert!(MarketplaceConfig::default().app_url().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: MarketplaceConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert_eq!(config.debug, Some(true));
        assert_eq!(config.frame_height, 900);
        assert_eq!(config.credentials_dir, PathBuf::from("auth"));
    }
}
