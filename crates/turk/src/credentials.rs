//! Marketplace credentials, read from `KEY=VALUE` files.

use std::collections::HashMap;
use expdj_core::Battery;
use tracing::debug;
use crate::{MarketplaceConfig, Result, TurkError};

const ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY_ID";

/// Access key pair for the marketplace API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key identifier
    pub access_key_id: String,
    /// Secret key
    pub secret_access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse a credentials file body.
    ///
    /// Blank lines and `#` comments are skipped; later keys override earlier ones.
    pub fn parse(text: &str) -> Result<Self> {
        let entries: HashMap<&str, &str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let get = |key: &'static str| {
            entries
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .ok_or(TurkError::MissingCredential(key))
        };

        Ok(Self {
            access_key_id: get(ACCESS_KEY)?,
            secret_access_key: get(SECRET_KEY)?,
        })
    }

    /// Load the credentials file a battery names from the configured directory.
    pub async fn load(config: &MarketplaceConfig, battery: &Battery) -> Result<Self> {
        let name = battery.credentials.as_deref().ok_or_else(|| {
            TurkError::InvalidSettings(format!("battery {} has no credentials file", battery.id))
        })?;
        let path = config.credentials_dir.join(name);
        debug!("Reading credentials from {}", path.display());
        let text = tokio::fs::read_to_string(&path).await?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expdj_core::SelectionPolicy;

    #[test]
    fn test_parse() {
        let creds = Credentials::parse(
            "# battery keys\nAWS_ACCESS_KEY_ID=AKIAEXAMPLE\n\nAWS_SECRET_ACCESS_KEY_ID = s3cr3t=\n",
        )
        .unwrap();
        assert_eq!(creds.access_key_id, "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "s3cr3t=");
    }

    #[test]
    fn test_missing_key() {
        let err = Credentials::parse("AWS_ACCESS_KEY_ID=AKIAEXAMPLE\n").unwrap_err();
        assert!(matches!(err, TurkError::MissingCredential("AWS_SECRET_ACCESS_KEY_ID")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn test_load_from_battery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lab.cred"),
            "AWS_ACCESS_KEY_ID=AKIA\nAWS_SECRET_ACCESS_KEY_ID=secret\n",
        )
        .unwrap();

        let config = MarketplaceConfig {
            credentials_dir: dir.path().to_path_buf(),
            ..MarketplaceConfig::default()
        };
        let mut battery = Battery::new("b", SelectionPolicy::default());
        assert!(Credentials::load(&config, &battery).await.is_err());

        battery.credentials = Some("lab.cred".to_string());
        let creds = Credentials::load(&config, &battery).await.unwrap();
        assert_eq!(creds.access_key_id, "AKIA");
    }
}
