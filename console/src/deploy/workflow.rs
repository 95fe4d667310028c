//! Deploy workflow
//!
//! Ties the file selector, the app name input and the upload together. The
//! staged bundle and name are fields of the workflow, created by whatever UI
//! shell drives it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::deploy::fsm::{WorkflowEvent, WorkflowFsm, WorkflowState};
use crate::deploy::naming::AppName;
use crate::deploy::selector::{FileCandidate, FileSelector, Selection};
use crate::errors::ConsoleError;
use crate::http::api::PublishApi;
use crate::http::progress::ProgressSender;
use crate::listing::controller::AppListController;
use crate::models::bundle::StagedFile;
use crate::models::deploy::DeployOptions;

/// Input that should receive focus after a refused action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    AppName,
}

/// Deploy workflow state object
pub struct DeployWorkflow {
    api: Arc<dyn PublishApi>,
    list: Arc<AppListController>,
    selector: FileSelector,
    fsm: WorkflowFsm,
    staged: Option<StagedFile>,
    app_name: String,
    notice: Option<String>,
    focus: Option<Focus>,
    state_tx: watch::Sender<WorkflowState>,
    pending_refresh: Option<JoinHandle<()>>,
}

impl DeployWorkflow {
    pub fn new(api: Arc<dyn PublishApi>, list: Arc<AppListController>) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        Self {
            api,
            list,
            selector: FileSelector::new(),
            fsm: WorkflowFsm::new(),
            staged: None,
            app_name: String::new(),
            notice: None,
            focus: None,
            state_tx,
            pending_refresh: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        self.fsm.state()
    }

    /// Observe state changes, including upload progress
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    /// Current content of the app name input
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn set_app_name(&mut self, name: impl Into<String>) {
        self.app_name = name.into();
    }

    /// Inline message from the last refused action
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }

    /// Hover signals go straight to the selector
    pub fn selector_mut(&mut self) -> &mut FileSelector {
        &mut self.selector
    }

    /// The submit control is only offered with a staged bundle
    pub fn can_submit(&self) -> bool {
        *self.fsm.state() == WorkflowState::FileStaged && self.staged.is_some()
    }

    /// Stage a picked or dropped file
    ///
    /// A rejected file leaves the workflow untouched apart from the notice.
    pub fn select(&mut self, candidate: FileCandidate) -> Result<(), ConsoleError> {
        self.ensure_selectable()?;
        let selection = self.selector.select(candidate);
        self.accept(selection)
    }

    /// Handle a drop on the selector; `None` for an empty drop
    pub fn drop_files(&mut self, files: Vec<FileCandidate>) -> Option<Result<(), ConsoleError>> {
        if let Err(e) = self.ensure_selectable() {
            self.selector.drag_leave();
            return Some(Err(e));
        }
        let selection = self.selector.drop_files(files)?;
        Some(self.accept(selection))
    }

    fn ensure_selectable(&self) -> Result<(), ConsoleError> {
        match self.fsm.state() {
            WorkflowState::Idle | WorkflowState::FileStaged => Ok(()),
            state => Err(ConsoleError::InvalidTransition(format!(
                "cannot select a file while {:?}",
                state
            ))),
        }
    }

    fn accept(&mut self, selection: Result<Selection, ConsoleError>) -> Result<(), ConsoleError> {
        let selection = match selection {
            Ok(selection) => selection,
            Err(e) => {
                self.notice = Some(e.to_string());
                return Err(e);
            }
        };

        self.transition(WorkflowEvent::Select)?;
        self.staged = Some(selection.staged);
        self.app_name = selection.suggested_name;
        self.notice = None;
        self.focus = None;
        Ok(())
    }

    /// Discard the staged bundle; ignored while an upload is running
    pub fn clear(&mut self) {
        if let Err(e) = self.transition(WorkflowEvent::Clear) {
            debug!("Clear ignored: {}", e);
            return;
        }
        self.discard();
    }

    /// Leave a terminal state and start over
    pub fn reset(&mut self) -> Result<(), ConsoleError> {
        self.transition(WorkflowEvent::Reset)?;
        self.discard();
        Ok(())
    }

    fn discard(&mut self) {
        self.staged = None;
        self.app_name.clear();
        self.notice = None;
        self.focus = None;
        self.selector.clear();
    }

    /// Validate the name and upload the staged bundle
    ///
    /// Refusals (bad name, nothing staged, wrong state) return an error and
    /// change no state. Once the upload starts, its outcome is always
    /// reported as `Succeeded` or `Failed`, never as an error.
    pub async fn submit(&mut self, options: DeployOptions) -> Result<&WorkflowState, ConsoleError> {
        let (name, staged) = match self.prepare_submit() {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!("Submit refused: {}", e);
                self.notice = Some(e.to_string());
                self.focus = Some(Focus::AppName);
                return Err(e);
            }
        };

        self.focus = None;
        self.notice = None;
        self.transition(WorkflowEvent::Submit)?;
        info!("Deploying {} as {}", staged.name, name);

        let (progress, mut progress_rx) = ProgressSender::channel();
        let api = self.api.clone();
        let upload = api.deploy(&name, &staged, options, progress);
        tokio::pin!(upload);

        let outcome = loop {
            tokio::select! {
                biased;
                Some(percent) = progress_rx.recv() => self.apply_progress(percent),
                outcome = &mut upload => break outcome,
            }
        };
        while let Ok(percent) = progress_rx.try_recv() {
            self.apply_progress(percent);
        }

        match outcome {
            Ok(result) => {
                self.transition(WorkflowEvent::Resolve(result))?;
                self.spawn_refresh();
            }
            Err(e) => {
                warn!("Deploy of {} failed: {}", name, e);
                self.transition(WorkflowEvent::Reject(e.to_string()))?;
            }
        }

        Ok(self.fsm.state())
    }

    /// Everything a submit needs, or the reason it is refused
    fn prepare_submit(&self) -> Result<(AppName, StagedFile), ConsoleError> {
        if *self.fsm.state() != WorkflowState::FileStaged {
            return Err(ConsoleError::InvalidTransition(format!(
                "cannot submit while {:?}",
                self.fsm.state()
            )));
        }
        let name = AppName::parse(&self.app_name)?;
        let staged = self.staged.clone().ok_or(ConsoleError::NothingStaged)?;
        Ok((name, staged))
    }

    fn apply_progress(&mut self, percent: u8) {
        if let Err(e) = self.transition(WorkflowEvent::Progress(percent)) {
            debug!("Progress event dropped: {}", e);
        }
    }

    /// Refresh the app list without waiting for it
    fn spawn_refresh(&mut self) {
        let list = self.list.clone();
        self.pending_refresh = Some(tokio::spawn(async move {
            list.refresh().await;
        }));
    }

    /// Wait for the list refresh started by the last successful deploy
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending_refresh.take() {
            if let Err(e) = handle.await {
                error!("List refresh task failed: {}", e);
            }
        }
    }

    fn transition(&mut self, event: WorkflowEvent) -> Result<(), ConsoleError> {
        self.fsm
            .process(event)
            .map_err(ConsoleError::InvalidTransition)?;
        self.state_tx.send_replace(self.fsm.state().clone());
        Ok(())
    }
}
