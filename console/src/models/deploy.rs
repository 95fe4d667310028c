//! Deployment models

use openapi_client::models::DeployResponse;
use serde::{Deserialize, Serialize};

/// Options forwarded with a deploy request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployOptions {
    /// Remove files that are not part of the new bundle
    pub clean: bool,
}

impl DeployOptions {
    /// Multipart encoding of the `clean` field
    pub fn clean_field(&self) -> &'static str {
        if self.clean {
            "true"
        } else {
            "false"
        }
    }
}

/// Outcome of a successful deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResult {
    /// Number of files the server stored
    pub uploaded: u64,

    /// Public URL of the deployed app
    pub url: String,

    /// App name echoed by the server
    pub app: Option<String>,

    /// Archive entries the server skipped (hidden files, OS junk)
    pub skipped: Option<u64>,
}

impl From<DeployResponse> for DeployResult {
    fn from(response: DeployResponse) -> Self {
        Self {
            uploaded: response.uploaded,
            url: response.url,
            app: response.app,
            skipped: response.skipped,
        }
    }
}
