//! Domain models

pub mod bundle;
pub mod deploy;

pub use openapi_client::models::AppSummary;
