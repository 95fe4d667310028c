//! Command dispatch

use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::Command;
use crate::app::render::{render_list, render_state};
use crate::app::state::AppState;
use crate::deploy::fsm::WorkflowState;
use crate::deploy::selector::FileCandidate;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::listing::confirm::ConfirmationState;
use crate::listing::view::AppRow;
use crate::models::deploy::DeployOptions;
use crate::storage::settings::Settings;
use crate::utils::version_info;

/// Run one console command
pub async fn run(command: Command, settings: &Settings) -> Result<(), ConsoleError> {
    if command == Command::Version {
        println!("{}", serde_json::to_string_pretty(&version_info())?);
        return Ok(());
    }

    let client = HttpClient::with_settings(&settings.api, &settings.upload)?;
    if command == Command::Diagnostic {
        return run_diagnostic(&client, settings).await;
    }

    let state = AppState::new(Arc::new(client), settings);
    match command {
        Command::Deploy { path, name, clean } => {
            let candidate = FileCandidate::from_path(&path).await?;
            deploy(&state, candidate, name, DeployOptions { clean }).await
        }
        Command::Invalidate { name } => invalidate(&state, &name).await,
        Command::Delete { name, yes } => delete(&state, &name, yes).await,
        _ => {
            state.list.refresh().await;
            println!("{}", render_list(&state.list));
            Ok(())
        }
    }
}

async fn run_diagnostic(client: &HttpClient, settings: &Settings) -> Result<(), ConsoleError> {
    println!("{}", "Settings".bold());
    println!("{}", serde_json::to_string_pretty(settings)?);

    println!("{}", "Health".bold());
    match client.health().await {
        Ok(health) => println!("{} {} ({})", "OK".green(), client.base_url(), health.status),
        Err(e) => {
            println!("{} {}: {}", "FAILED".red(), client.base_url(), e);
            return Err(e);
        }
    }
    Ok(())
}

async fn deploy(
    state: &AppState,
    candidate: FileCandidate,
    name: Option<String>,
    options: DeployOptions,
) -> Result<(), ConsoleError> {
    let mut workflow = state.workflow();
    workflow.select(candidate)?;
    if let Some(name) = name {
        workflow.set_app_name(name);
    }
    if let Some(staged) = workflow.staged() {
        println!(
            "Deploying {} ({}) as '{}'",
            staged.name,
            staged.size_human(),
            workflow.app_name()
        );
    }

    let renderer = spawn_progress_renderer(workflow.subscribe());
    let outcome = workflow.submit(options).await.cloned();
    renderer.abort();
    let final_state = outcome?;
    eprintln!();
    println!("{}", render_state(&final_state));

    match final_state {
        WorkflowState::Succeeded(_) => {
            workflow.settle().await;
            println!("{}", render_list(&state.list));
            Ok(())
        }
        _ => Err(ConsoleError::Internal(format!(
            "deploy of '{}' did not succeed",
            workflow.app_name()
        ))),
    }
}

/// Redraw the progress line on stderr while the upload runs
fn spawn_progress_renderer(mut rx: watch::Receiver<WorkflowState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if let WorkflowState::Uploading(_) = state {
                eprint!("\r{}", render_state(&state));
            }
        }
    })
}

async fn invalidate(state: &AppState, name: &str) -> Result<(), ConsoleError> {
    state.list.refresh().await;
    let target = find_row(state, name, |row| row.invalidate.target().to_string())?;

    state.list.invalidate_one(&target).await?;
    println!("{}", render_list(&state.list));
    Ok(())
}

async fn delete(state: &AppState, name: &str, yes: bool) -> Result<(), ConsoleError> {
    state.list.refresh().await;
    let target = find_row(state, name, |row| row.delete.target().to_string())?;

    let mut gate = state.delete_gate();
    gate.request(target);

    let confirmed = yes
        || prompt_confirmation(
            gate.state(),
            BufReader::new(tokio::io::stdin()),
            &mut tokio::io::stdout(),
        )
        .await?;
    if !confirmed {
        gate.cancel();
        println!("Delete cancelled");
        return Ok(());
    }

    match gate.confirm().await {
        Some(Ok(())) => {
            info!("Deleted {}", name);
            println!("{} {}", "Deleted".green().bold(), name);
            println!("{}", render_list(&state.list));
            Ok(())
        }
        Some(Err(e)) => {
            error!("Delete of {} failed: {}", name, e);
            Err(e)
        }
        None => Ok(()),
    }
}

/// Resolve the row control for `name` from the current render
///
/// The list is printed when it holds no such row, so the operator sees why.
fn find_row<F>(state: &AppState, name: &str, control: F) -> Result<String, ConsoleError>
where
    F: Fn(&AppRow) -> String,
{
    let view = state.list.view();
    match view.rows().iter().find(|row| row.app.name == name) {
        Some(row) => Ok(control(row)),
        None => {
            println!("{}", render_list(&state.list));
            Err(ConsoleError::StaleAction(name.to_string()))
        }
    }
}

/// Ask the operator for a y/N answer; anything but "y" or "yes" declines
async fn prompt_confirmation<R, W>(
    state: &ConfirmationState,
    mut input: R,
    output: &mut W,
) -> Result<bool, ConsoleError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let target = match state {
        ConfirmationState::AwaitingConfirmation(target) => target,
        ConfirmationState::Closed => return Ok(false),
    };

    output
        .write_all(format!("Delete '{}' and all its files? [y/N] ", target).as_bytes())
        .await?;
    output.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
