//! App list and per-app action endpoints

use tracing::{debug, error, warn};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::response::{interpret_app_list, rejection_message};
use crate::models::AppSummary;

impl HttpClient {
    /// `GET /api/apps`
    pub async fn list_apps(&self) -> Result<Vec<AppSummary>, ConsoleError> {
        let url = self.endpoint(&["api", "apps"])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("App list request failed: {}", e);
            ConsoleError::ListUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ConsoleError::ListUnavailable(e.to_string()))?;

        interpret_app_list(status, &body).inspect_err(|e| warn!("App list unavailable: {}", e))
    }

    /// `POST /api/apps/{name}/invalidate`
    pub async fn invalidate_app(&self, name: &str) -> Result<(), ConsoleError> {
        let url = self.endpoint(&["api", "apps", name, "invalidate"])?;
        debug!("POST {}", url);

        let response = self.client.post(url).send().await.map_err(action_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.bytes().await.unwrap_or_default();
            let message = rejection_message(status, &body);
            error!("Invalidate of {} failed: {} - {}", name, status, message);
            return Err(ConsoleError::ActionRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// `DELETE /api/apps/{name}`
    pub async fn delete_app(&self, name: &str) -> Result<(), ConsoleError> {
        let url = self.endpoint(&["api", "apps", name])?;
        debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await.map_err(action_transport)?;

        let status = response.status();
        if !status.is_success() {
            error!("Delete of {} failed: {}", name, status);
            return Err(ConsoleError::ActionRejected {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        Ok(())
    }
}

fn action_transport(err: reqwest::Error) -> ConsoleError {
    error!("Request failed without a response: {}", err);
    ConsoleError::ActionTransportFailure(err.to_string())
}
