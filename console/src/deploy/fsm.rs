//! Finite State Machine for the deploy workflow

use serde::{Deserialize, Serialize};

use crate::models::deploy::DeployResult;

/// Deploy workflow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing staged, waiting for a bundle
    Idle,

    /// A bundle is staged and the name input is editable
    FileStaged,

    /// Upload in progress, percent of the bundle handed to the transport
    Uploading(u8),

    /// Server accepted the bundle
    Succeeded(DeployResult),

    /// Deploy failed with an operator-facing reason
    Failed(String),
}

impl WorkflowState {
    /// Whether this is a terminal presentation state
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded(_) | WorkflowState::Failed(_))
    }
}

/// Deploy workflow event
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A valid bundle was selected
    Select,

    /// The staged bundle was discarded
    Clear,

    /// A validated submission was issued
    Submit,

    /// Upload progress in percent
    Progress(u8),

    /// Upload resolved
    Resolve(DeployResult),

    /// Upload rejected
    Reject(String),

    /// Result acknowledged, back to the start
    Reset,
}

/// Deploy workflow FSM
#[derive(Debug, Clone)]
pub struct WorkflowFsm {
    state: WorkflowState,
}

impl WorkflowFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }

    /// Get current state
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Upload progress while uploading
    pub fn progress(&self) -> Option<u8> {
        match self.state {
            WorkflowState::Uploading(percent) => Some(percent),
            _ => None,
        }
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: WorkflowEvent) -> Result<(), String> {
        let new_state = match (&self.state, event) {
            // Selection is only offered while idle or replacing a staged bundle
            (WorkflowState::Idle | WorkflowState::FileStaged, WorkflowEvent::Select) => {
                WorkflowState::FileStaged
            }

            (WorkflowState::Idle, WorkflowEvent::Clear) => WorkflowState::Idle,
            (WorkflowState::FileStaged, WorkflowEvent::Clear) => WorkflowState::Idle,
            (WorkflowState::Succeeded(_) | WorkflowState::Failed(_), WorkflowEvent::Clear) => {
                WorkflowState::Idle
            }

            (WorkflowState::FileStaged, WorkflowEvent::Submit) => WorkflowState::Uploading(0),

            (WorkflowState::Uploading(current), WorkflowEvent::Progress(next))
                if next >= *current && next <= 100 =>
            {
                WorkflowState::Uploading(next)
            }

            (WorkflowState::Uploading(_), WorkflowEvent::Resolve(result)) => {
                WorkflowState::Succeeded(result)
            }
            (WorkflowState::Uploading(_), WorkflowEvent::Reject(reason)) => {
                WorkflowState::Failed(reason)
            }

            (WorkflowState::Succeeded(_) | WorkflowState::Failed(_), WorkflowEvent::Reset) => {
                WorkflowState::Idle
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("{:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for WorkflowFsm {
    fn default() -> Self {
        Self::new()
    }
}
