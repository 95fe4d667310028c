//! Delete confirmation gate

use std::sync::Arc;

use tracing::debug;

use crate::errors::ConsoleError;
use crate::listing::controller::AppListController;

/// Confirmation dialog state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfirmationState {
    #[default]
    Closed,
    AwaitingConfirmation(String),
}

/// Guards the destructive delete action behind an explicit confirmation
pub struct DeleteConfirmationGate {
    state: ConfirmationState,
    list: Arc<AppListController>,
}

impl DeleteConfirmationGate {
    pub fn new(list: Arc<AppListController>) -> Self {
        Self {
            state: ConfirmationState::Closed,
            list,
        }
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    /// The app awaiting confirmation, if the dialog is open
    pub fn target(&self) -> Option<&str> {
        match &self.state {
            ConfirmationState::AwaitingConfirmation(target) => Some(target),
            ConfirmationState::Closed => None,
        }
    }

    /// Open the dialog for `name`
    pub fn request(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!("Delete confirmation requested for {}", name);
        self.state = ConfirmationState::AwaitingConfirmation(name);
    }

    /// Delete the target and close the dialog
    ///
    /// Returns `None` when the dialog was closed. The dialog closes before the
    /// request is issued, whatever its outcome.
    pub async fn confirm(&mut self) -> Option<Result<(), ConsoleError>> {
        let target = match std::mem::take(&mut self.state) {
            ConfirmationState::AwaitingConfirmation(target) => target,
            ConfirmationState::Closed => return None,
        };
        Some(self.list.delete_one(&target).await)
    }

    pub fn cancel(&mut self) {
        self.state = ConfirmationState::Closed;
    }

    /// Click outside the dialog
    pub fn dismiss(&mut self) {
        self.cancel();
    }
}
