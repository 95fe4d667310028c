//! Terminal rendering of the console views

use colored::Colorize;

use crate::deploy::fsm::WorkflowState;
use crate::listing::controller::AppListController;
use crate::listing::view::ListView;

/// Render the app list region
pub fn render_list(list: &AppListController) -> String {
    let mut out = String::new();

    match list.view() {
        ListView::Loading => out.push_str(&"Loading applications...".dimmed().to_string()),
        ListView::Empty => out.push_str(&"No applications deployed yet.".dimmed().to_string()),
        ListView::Unavailable(message) => out.push_str(&message.red().to_string()),
        ListView::Rows(rows) => {
            for row in rows {
                let app = &row.app;
                let acked = if list.is_acknowledged(row.invalidate.target()) {
                    format!("  {}", "cache invalidated".green())
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "{}  {}\n    {} files, {}, modified {}{}\n",
                    app.name.bold(),
                    app.url.cyan(),
                    app.file_count,
                    app.total_size_human,
                    app.last_modified_human,
                    acked,
                ));
            }
            out.pop();
        }
    }

    if let Some(updated_at) = list.updated_at() {
        out.push_str(&format!(
            "\n{}",
            format!("Updated {}", updated_at.format("%H:%M:%S")).dimmed()
        ));
    }
    if let Some(notice) = list.notice() {
        out.push_str(&format!("\n{}", notice.red()));
    }
    out
}

/// Render the deploy workflow state on one line
pub fn render_state(state: &WorkflowState) -> String {
    match state {
        WorkflowState::Idle => "No bundle selected".dimmed().to_string(),
        WorkflowState::FileStaged => "Bundle staged".to_string(),
        WorkflowState::Uploading(100) => "Uploading 100%, server processing...".yellow().to_string(),
        WorkflowState::Uploading(percent) => format!("Uploading {}%", percent).yellow().to_string(),
        WorkflowState::Succeeded(result) => {
            let mut line = format!(
                "{} {} files uploaded, live at {}",
                "Deployed:".green().bold(),
                result.uploaded,
                result.url
            );
            if let Some(skipped) = result.skipped.filter(|n| *n > 0) {
                line.push_str(&format!(" ({} skipped)", skipped));
            }
            line
        }
        WorkflowState::Failed(reason) => format!("{} {}", "Deploy failed:".red().bold(), reason),
    }
}
