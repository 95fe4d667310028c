//! Interpretation of publishing API responses

use openapi_client::models::{AppListResponse, DeployResponse, ErrorResponse};
use reqwest::StatusCode;

use crate::errors::ConsoleError;
use crate::models::deploy::DeployResult;
use crate::models::AppSummary;

/// Operator-facing message for a non-2xx response
///
/// Uses `detail`, then `error`, then falls back to the status code.
pub fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Map a deploy response to its single outcome
pub fn interpret_deploy(status: StatusCode, body: &[u8]) -> Result<DeployResult, ConsoleError> {
    if status.is_success() {
        return serde_json::from_slice::<DeployResponse>(body)
            .map(DeployResult::from)
            .map_err(|_| ConsoleError::MalformedResponse {
                status: status.as_u16(),
            });
    }

    Err(ConsoleError::UploadRejected {
        status: status.as_u16(),
        message: rejection_message(status, body),
    })
}

/// Map an app list response
pub fn interpret_app_list(status: StatusCode, body: &[u8]) -> Result<Vec<AppSummary>, ConsoleError> {
    if !status.is_success() {
        return Err(ConsoleError::ListUnavailable(format!("HTTP {}", status.as_u16())));
    }

    serde_json::from_slice::<AppListResponse>(body)
        .map(|list| list.apps)
        .map_err(|e| ConsoleError::ListUnavailable(format!("unreadable response: {}", e)))
}
