//! Marketplace client seam.

use expdj_selection::Session;
use tracing::info;
use crate::{Credentials, DeploymentUrls, ExternalQuestion, Host, MarketplaceConfig, Result};

/// What the selection layer needs from a task marketplace.
pub trait TaskMarketplace: Send + Sync {
    /// The external question that serves an assembled session.
    fn question_for(&self, session: &Session) -> Result<ExternalQuestion>;

    /// Worker-facing page for a published task group.
    fn worker_task_url(&self, group_id: &str) -> String;
}

/// Mechanical Turk client built from explicit settings.
#[derive(Debug, Clone)]
pub struct TurkClient {
    config: MarketplaceConfig,
    credentials: Credentials,
    host: Host,
}

impl TurkClient {
    /// Create a client, validating the configured host.
    pub fn new(config: MarketplaceConfig, credentials: Credentials) -> Result<Self> {
        let host = config.resolve_host()?;
        info!("Marketplace client using {}", host);
        Ok(Self {
            config,
            credentials,
            host,
        })
    }

    /// Resolved API host.
    pub fn host(&self) -> Host {
        self.host
    }

    /// Access key in use.
    pub fn access_key_id(&self) -> &str {
        &self.credentials.access_key_id
    }

    /// Settings the client was built with.
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }
}

impl TaskMarketplace for TurkClient {
    fn question_for(&self, session: &Session) -> Result<ExternalQuestion> {
        let urls = DeploymentUrls::new(self.config.app_url()?);
        let url = urls.serve(session.battery_id, &session.worker_id.to_string());
        Ok(ExternalQuestion::new(url, self.config.frame_height))
    }

    fn worker_task_url(&self, group_id: &str) -> String {
        format!("{}/mturk/preview?groupId={}", self.host.worker_url(), group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expdj_core::{BatteryId, WorkerId};
    use expdj_selection::BatteryProgress;

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
        }
    }

    fn session() -> Session {
        Session {
            battery_id: BatteryId::new(),
            worker_id: WorkerId::new(),
            experiments: Vec::new(),
            total_minutes: 0,
            progress: BatteryProgress { completed: 0, remaining: 0, total: 0 },
            finished: true,
        }
    }

    #[test]
    fn test_question_points_at_serve_page() {
        let client = TurkClient::new(MarketplaceConfig::sandbox("https://expfactory.example.org"), credentials()).unwrap();
        let session = session();
        let question = client.question_for(&session).unwrap();
        assert_eq!(
            question.external_url,
            format!(
                "https://expfactory.example.org/batteries/{}/{}/serve",
                session.battery_id, session.worker_id
            )
        );
        assert_eq!(question.frame_height, 900);
        assert_eq!(client.host(), Host::Sandbox);
    }

    #[test]
    fn test_question_requires_app_url() {
        let client = TurkClient::new(MarketplaceConfig::default(), credentials()).unwrap();
        assert!(client.question_for(&session()).is_err());
    }

    #[test]
    fn test_worker_task_url() {
        let client = TurkClient::new(MarketplaceConfig::default(), credentials()).unwrap();
        assert_eq!(
            client.worker_task_url("3ABC"),
            "https://www.mturk.com/mturk/preview?groupId=3ABC"
        );
    }

    #[test]
    fn test_invalid_host_rejected_at_construction() {
        let config = MarketplaceConfig {
            host: Some("localhost".to_string()),
            debug: Some(false),
            ..MarketplaceConfig::default()
        };
        assert!(TurkClient::new(config, credentials()).is_err());
    }
}
