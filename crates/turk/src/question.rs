//! Deployment URLs and the external question served in a marketplace task.

use expdj_core::BatteryId;
use serde::Serialize;

const QUESTION_SCHEMA: &str =
    "http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2006-07-14/ExternalQuestion.xsd";

/// A task whose content is hosted by this application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalQuestion {
    /// Page the worker is sent to
    pub external_url: String,
    /// Frame height, in pixels
    pub frame_height: u32,
}

impl ExternalQuestion {
    /// Create a question.
    pub fn new(external_url: impl Into<String>, frame_height: u32) -> Self {
        Self {
            external_url: external_url.into(),
            frame_height,
        }
    }

    /// Render the question document the marketplace expects.
    pub fn to_xml(&self) -> String {
        format!(
            "<ExternalQuestion xmlns=\"{}\"><ExternalURL>{}</ExternalURL><FrameHeight>{}</FrameHeight></ExternalQuestion>",
            QUESTION_SCHEMA,
            html_escape::encode_text(&self.external_url),
            self.frame_height,
        )
    }
}

/// Builds the battery deployment URLs under an application base URL.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentUrls<'a> {
    base: &'a str,
}

impl<'a> DeploymentUrls<'a> {
    /// Use `base` (no trailing slash) as the application root.
    pub fn new(base: &'a str) -> Self {
        Self { base }
    }

    /// Preview page for a worker.
    pub fn serve(&self, battery: BatteryId, worker: &str) -> String {
        format!("{}/batteries/{}/{}/serve", self.base, battery, worker)
    }

    /// Page reached once the worker accepts the task.
    pub fn accept(&self, battery: BatteryId, worker: &str) -> String {
        format!("{}/batteries/{}/{}/accept", self.base, battery, worker)
    }

    /// Anonymous link, keyed by a generated access key.
    pub fn anonymous(&self, battery: BatteryId, key: &str) -> String {
        format!("{}/batteries/{}/{}/anon", self.base, battery, key)
    }
}
