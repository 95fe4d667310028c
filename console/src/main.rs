//! Publishing Console - Entry Point
//!
//! Deploys zipped static sites to a publishing service and manages the
//! deployed applications from the terminal.

use std::env;
use std::process::ExitCode;

use colored::Colorize;
use tracing::{debug, error};

use pubconsole::app::options::{parse_args, Command};
use pubconsole::app::run::run;
use pubconsole::filesys::file::File;
use pubconsole::logs::{init_logging, LogOptions};
use pubconsole::storage::layout::StorageLayout;
use pubconsole::storage::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_args(env::args().skip(1));

    let command = match Command::from_args(&cli_args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let layout = StorageLayout::default();
    let settings_file = match cli_args.get("config") {
        Some(path) => File::new(path),
        None => layout.settings_file(),
    };
    let resolved = Settings::resolve(&settings_file, |key| env::var(key).ok(), &cli_args).await;
    let settings = match resolved {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
    };
    let _guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };
    debug!("Running {:?} against {}", command, settings.api.base_url);

    match run(command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

