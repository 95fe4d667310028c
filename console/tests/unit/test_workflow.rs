//! Deploy workflow tests

use std::sync::Arc;

use pubconsole::deploy::fsm::WorkflowState;
use pubconsole::deploy::selector::FileCandidate;
use pubconsole::deploy::workflow::{DeployWorkflow, Focus};
use pubconsole::errors::ConsoleError;
use pubconsole::listing::controller::AppListController;
use pubconsole::listing::view::ListView;
use pubconsole::models::deploy::{DeployOptions, DeployResult};

use crate::fakes::{DeployCall, DeployScript, FakeApi};

fn setup() -> (Arc<FakeApi>, Arc<AppListController>, DeployWorkflow) {
    let api = Arc::new(FakeApi::new(vec![]));
    let list = Arc::new(AppListController::new(api.clone()));
    let workflow = DeployWorkflow::new(api.clone(), list.clone());
    (api, list, workflow)
}

fn zip(name: &str) -> FileCandidate {
    FileCandidate::from_bytes(name, vec![7u8; 128])
}

fn myapp_result() -> DeployResult {
    DeployResult {
        uploaded: 42,
        url: "/myapp/".to_string(),
        app: None,
        skipped: None,
    }
}

#[tokio::test]
async fn test_select_stages_bundle_and_suggests_name() {
    let (_api, _list, mut workflow) = setup();
    assert!(!workflow.can_submit());

    workflow.select(zip("My Site v2.zip")).unwrap();

    assert_eq!(workflow.state(), &WorkflowState::FileStaged);
    assert_eq!(workflow.app_name(), "my-site-v2");
    assert_eq!(workflow.staged().unwrap().name, "My Site v2.zip");
    assert_eq!(workflow.staged().unwrap().size_bytes, 128);
    assert!(workflow.can_submit());
}

#[tokio::test]
async fn test_non_zip_selection_is_rejected() {
    let (_api, _list, mut workflow) = setup();

    for name in ["site.tar.gz", "zip", "archive.zip.txt", "notes"] {
        let err = workflow.select(zip(name)).unwrap_err();
        assert!(matches!(err, ConsoleError::UnsupportedType(_)), "{}", name);
        assert_eq!(workflow.state(), &WorkflowState::Idle);
        assert!(workflow.staged().is_none());
        assert!(workflow.notice().is_some());
    }

    workflow.select(zip("SITE.ZIP")).unwrap();
    assert_eq!(workflow.state(), &WorkflowState::FileStaged);
    assert!(workflow.notice().is_none());
}

#[tokio::test]
async fn test_rejected_file_keeps_previous_selection() {
    let (_api, _list, mut workflow) = setup();
    workflow.select(zip("blog.zip")).unwrap();

    assert!(workflow.select(zip("blog.pdf")).is_err());

    assert_eq!(workflow.state(), &WorkflowState::FileStaged);
    assert_eq!(workflow.staged().unwrap().name, "blog.zip");
    assert_eq!(workflow.app_name(), "blog");
}

#[tokio::test]
async fn test_drop_takes_first_file_only() {
    let (_api, _list, mut workflow) = setup();
    workflow.selector_mut().drag_over();
    assert!(workflow.selector().is_hovering());

    assert!(workflow.drop_files(vec![]).is_none());
    assert_eq!(workflow.state(), &WorkflowState::Idle);

    workflow.selector_mut().drag_over();
    workflow
        .drop_files(vec![zip("first.zip"), zip("second.zip")])
        .unwrap()
        .unwrap();

    assert!(!workflow.selector().is_hovering());
    assert_eq!(workflow.staged().unwrap().name, "first.zip");
    assert_eq!(workflow.app_name(), "first");
}

#[tokio::test]
async fn test_invalid_names_are_refused_before_upload() {
    let (api, _list, mut workflow) = setup();
    workflow.select(zip("site.zip")).unwrap();

    for name in ["", "   ", "-bad-", "My-App", "-app", "app-", "my_app", "my app", "a.b"] {
        workflow.set_app_name(name);
        let err = workflow.submit(DeployOptions::default()).await.unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidName(_)), "{:?}", name);
        assert_eq!(workflow.focus(), Some(Focus::AppName));
        assert_eq!(workflow.state(), &WorkflowState::FileStaged);
        assert!(workflow.notice().is_some());
    }

    assert!(api.deploy_calls().is_empty());
}

#[tokio::test]
async fn test_valid_names_reach_the_server() {
    for name in ["a", "7", "my-app", "a1-b2-c3", "  padded  "] {
        let (api, _list, mut workflow) = setup();
        workflow.select(zip("site.zip")).unwrap();
        workflow.set_app_name(name);

        let state = workflow.submit(DeployOptions::default()).await.unwrap();
        assert!(matches!(state, WorkflowState::Succeeded(_)), "{:?}", name);
        assert_eq!(api.deploy_calls()[0].name, name.trim());
        assert_eq!(workflow.focus(), None);
    }
}

#[tokio::test]
async fn test_successful_deploy_refreshes_list() {
    let (api, list, mut workflow) = setup();
    api.script_deploy(DeployScript::Succeed(myapp_result()), vec![0, 50, 100]);
    workflow.select(zip("myapp.zip")).unwrap();

    let state = workflow
        .submit(DeployOptions { clean: true })
        .await
        .unwrap()
        .clone();

    assert_eq!(state, WorkflowState::Succeeded(myapp_result()));
    assert_eq!(
        api.deploy_calls(),
        vec![DeployCall {
            name: "myapp".to_string(),
            file_name: "myapp.zip".to_string(),
            size: 128,
            clean: true,
        }]
    );

    workflow.settle().await;
    assert_eq!(api.list_calls(), 1);
    assert!(list.view().contains("myapp"));
}

#[tokio::test]
async fn test_rejected_deploy_shows_server_message() {
    let (api, list, mut workflow) = setup();
    api.script_deploy(
        DeployScript::Reject {
            status: 413,
            message: "too large".to_string(),
        },
        vec![0, 100],
    );
    workflow.select(zip("huge.zip")).unwrap();

    let state = workflow.submit(DeployOptions::default()).await.unwrap();
    assert_eq!(state, &WorkflowState::Failed("too large".to_string()));

    workflow.settle().await;
    assert_eq!(api.list_calls(), 0);
    assert_eq!(list.view(), ListView::Loading);
}

#[tokio::test]
async fn test_transport_failure_is_a_failed_state() {
    let (api, _list, mut workflow) = setup();
    api.script_deploy(DeployScript::Unreachable, vec![0, 30]);
    workflow.select(zip("site.zip")).unwrap();

    let state = workflow.submit(DeployOptions::default()).await.unwrap();
    match state {
        WorkflowState::Failed(reason) => assert!(reason.contains("network error")),
        state => panic!("expected a failed deploy, got {:?}", state),
    }
}

#[tokio::test]
async fn test_out_of_order_progress_is_ignored() {
    let (api, _list, mut workflow) = setup();
    api.script_deploy(DeployScript::Succeed(myapp_result()), vec![0, 60, 20, 100]);
    workflow.select(zip("myapp.zip")).unwrap();

    let mut updates = workflow.subscribe();
    let recorder = tokio::spawn(async move {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            seen.push(updates.borrow_and_update().clone());
        }
        seen
    });

    let state = workflow.submit(DeployOptions::default()).await.unwrap().clone();
    assert_eq!(state, WorkflowState::Succeeded(myapp_result()));
    drop(workflow);

    let seen = recorder.await.unwrap();
    let progress: Vec<u8> = seen
        .iter()
        .filter_map(|state| match state {
            WorkflowState::Uploading(percent) => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{:?}", progress);
    assert!(!progress.contains(&20), "{:?}", progress);
    assert!(progress.contains(&60), "{:?}", progress);
    assert_eq!(progress.last(), Some(&100));
    assert_eq!(seen.last(), Some(&state));
}

#[tokio::test]
async fn test_submit_without_staged_bundle_is_refused() {
    let (api, _list, mut workflow) = setup();
    workflow.set_app_name("blog");

    let err = workflow.submit(DeployOptions::default()).await.unwrap_err();

    assert!(matches!(err, ConsoleError::InvalidTransition(_)));
    assert_eq!(workflow.state(), &WorkflowState::Idle);
    assert_eq!(workflow.focus(), Some(Focus::AppName));
    assert!(workflow.notice().is_some());
    assert!(api.deploy_calls().is_empty());
}

#[tokio::test]
async fn test_resubmit_after_terminal_state_is_refused() {
    let (api, _list, mut workflow) = setup();
    workflow.select(zip("blog.zip")).unwrap();
    workflow.submit(DeployOptions::default()).await.unwrap();
    assert_eq!(workflow.focus(), None);

    let err = workflow.submit(DeployOptions::default()).await.unwrap_err();

    assert!(matches!(err, ConsoleError::InvalidTransition(_)));
    assert!(matches!(workflow.state(), WorkflowState::Succeeded(_)));
    assert_eq!(workflow.focus(), Some(Focus::AppName));
    assert_eq!(api.deploy_calls().len(), 1);
}

#[tokio::test]
async fn test_terminal_states_need_reset_or_clear() {
    let (_api, _list, mut workflow) = setup();
    workflow.select(zip("blog.zip")).unwrap();
    workflow.submit(DeployOptions::default()).await.unwrap();

    let err = workflow.select(zip("other.zip")).unwrap_err();
    assert!(matches!(err, ConsoleError::InvalidTransition(_)));
    assert!(!workflow.can_submit());

    workflow.reset().unwrap();
    assert_eq!(workflow.state(), &WorkflowState::Idle);
    assert!(workflow.staged().is_none());
    assert_eq!(workflow.app_name(), "");

    assert!(workflow.reset().is_err());
}

#[tokio::test]
async fn test_clear_discards_staged_bundle() {
    let (_api, _list, mut workflow) = setup();
    workflow.select(zip("blog.zip")).unwrap();
    workflow.set_app_name("renamed");

    workflow.clear();

    assert_eq!(workflow.state(), &WorkflowState::Idle);
    assert!(workflow.staged().is_none());
    assert_eq!(workflow.app_name(), "");
    assert!(!workflow.can_submit());
}

#[tokio::test]
async fn test_bundle_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Docs Site.ZIP");
    tokio::fs::write(&path, vec![1u8; 2048]).await.unwrap();

    let (api, _list, mut workflow) = setup();
    let candidate = FileCandidate::from_path(&path).await.unwrap();
    workflow.select(candidate).unwrap();
    assert_eq!(workflow.app_name(), "docs-site");
    assert_eq!(workflow.staged().unwrap().size_human(), "2.0 KB");

    workflow.submit(DeployOptions::default()).await.unwrap();
    assert_eq!(api.deploy_calls()[0].size, 2048);
    assert_eq!(api.deploy_calls()[0].file_name, "Docs Site.ZIP");
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FileCandidate::from_path(dir.path().join("absent.zip")).await.is_err());
    assert!(FileCandidate::from_path(dir.path()).await.is_err());
}
