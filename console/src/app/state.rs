//! Application state

use std::sync::Arc;

use crate::deploy::workflow::DeployWorkflow;
use crate::http::api::PublishApi;
use crate::listing::confirm::DeleteConfirmationGate;
use crate::listing::controller::AppListController;
use crate::storage::settings::Settings;

/// Components shared by every command
pub struct AppState {
    pub api: Arc<dyn PublishApi>,
    pub list: Arc<AppListController>,
}

impl AppState {
    pub fn new(api: Arc<dyn PublishApi>, settings: &Settings) -> Self {
        let list = Arc::new(AppListController::with_ack_delay(
            api.clone(),
            settings.list.ack_delay(),
        ));
        Self { api, list }
    }

    pub fn workflow(&self) -> DeployWorkflow {
        DeployWorkflow::new(self.api.clone(), self.list.clone())
    }

    pub fn delete_gate(&self) -> DeleteConfirmationGate {
        DeleteConfirmationGate::new(self.list.clone())
    }
}
