//! Publishing API seam

use async_trait::async_trait;

use crate::deploy::naming::AppName;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::progress::ProgressSender;
use crate::models::bundle::StagedFile;
use crate::models::deploy::{DeployOptions, DeployResult};
use crate::models::AppSummary;

/// Remote publishing API, as seen by the workflow and the app list
#[async_trait]
pub trait PublishApi: Send + Sync {
    /// Fetch the deployed applications in server order
    async fn list_apps(&self) -> Result<Vec<AppSummary>, ConsoleError>;

    /// Upload a bundle; resolves exactly once
    async fn deploy(
        &self,
        name: &AppName,
        bundle: &StagedFile,
        options: DeployOptions,
        progress: ProgressSender,
    ) -> Result<DeployResult, ConsoleError>;

    /// Invalidate the CDN cache of one app
    async fn invalidate(&self, name: &str) -> Result<(), ConsoleError>;

    /// Delete one app
    async fn delete(&self, name: &str) -> Result<(), ConsoleError>;
}

#[async_trait]
impl PublishApi for HttpClient {
    async fn list_apps(&self) -> Result<Vec<AppSummary>, ConsoleError> {
        HttpClient::list_apps(self).await
    }

    async fn deploy(
        &self,
        name: &AppName,
        bundle: &StagedFile,
        options: DeployOptions,
        progress: ProgressSender,
    ) -> Result<DeployResult, ConsoleError> {
        self.deploy_bundle(name, bundle, options, progress).await
    }

    async fn invalidate(&self, name: &str) -> Result<(), ConsoleError> {
        self.invalidate_app(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), ConsoleError> {
        self.delete_app(name).await
    }
}
