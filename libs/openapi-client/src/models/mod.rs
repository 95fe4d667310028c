//! API models

use serde::{Deserialize, Serialize};

/// A deployed application as reported by `GET /api/apps`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub total_size_human: String,
    #[serde(default = "default_last_modified_human")]
    pub last_modified_human: String,
    /// Raw total size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    /// Raw last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

fn default_last_modified_human() -> String {
    "–".to_string()
}

/// Application list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppListResponse {
    /// A missing field means no applications
    #[serde(default)]
    pub apps: Vec<AppSummary>,
}

/// Deploy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub uploaded: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error response
///
/// The server reports failures either as `{"detail": ...}` or as
/// `{"error": "..."}`. `detail` is usually a string but validation failures
/// carry a structured value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Human-readable message, `detail` first, then `error`
    pub fn message(&self) -> Option<String> {
        let detail = match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(serde_json::Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        };
        detail.or_else(|| self.error.clone().filter(|e| !e.is_empty()))
    }
}
