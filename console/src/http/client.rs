//! HTTP client implementation

use openapi_client::models::HealthResponse;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use crate::errors::ConsoleError;
use crate::storage::settings::{ApiSettings, UploadSettings};

/// HTTP client for the publishing admin API
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub(crate) client: Client,
    base_url: Url,
    pub(crate) chunk_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        let api = ApiSettings {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        Self::with_settings(&api, &UploadSettings::default())
    }

    /// Create a new HTTP client from settings
    ///
    /// Only connecting is time-bounded; an upload runs until the server
    /// answers or the transport fails.
    pub fn with_settings(api: &ApiSettings, upload: &UploadSettings) -> Result<Self, ConsoleError> {
        let base_url = Url::parse(&api.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::ConfigError(format!(
                "base URL cannot carry a path: {}",
                api.base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(api.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            chunk_size: upload.chunk_size.max(1),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL below the base URL
    ///
    /// Every segment is percent-encoded on its own, so an app name can never
    /// add path components.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ConsoleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConsoleError::ConfigError(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check the service health endpoint
    pub async fn health(&self) -> Result<HealthResponse, ConsoleError> {
        let url = self.endpoint(&["health"])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Health check failed: {}", status);
            return Err(ConsoleError::ActionRejected {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}
