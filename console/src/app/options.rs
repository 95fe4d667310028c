//! Command line options

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::ConsoleError;

/// What the console was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print version info
    Version,

    /// Print resolved settings and the service health
    Diagnostic,

    /// Print the deployed app list
    List,

    /// Deploy a bundle
    Deploy {
        path: PathBuf,
        name: Option<String>,
        clean: bool,
    },

    /// Invalidate the CDN cache of one app
    Invalidate { name: String },

    /// Delete one app, after confirmation unless `yes` is set
    Delete { name: String, yes: bool },
}

impl Command {
    /// Pick the command from parsed `--key=value` arguments; defaults to `List`
    pub fn from_args(cli_args: &HashMap<String, String>) -> Result<Self, ConsoleError> {
        if cli_args.contains_key("version") {
            return Ok(Command::Version);
        }
        if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
            return Ok(Command::Diagnostic);
        }
        if let Some(path) = cli_args.get("deploy") {
            return Ok(Command::Deploy {
                path: PathBuf::from(required("deploy", path)?),
                name: cli_args.get("name").cloned(),
                clean: flag(cli_args, "clean"),
            });
        }
        if let Some(name) = cli_args.get("invalidate") {
            return Ok(Command::Invalidate {
                name: required("invalidate", name)?,
            });
        }
        if let Some(name) = cli_args.get("delete") {
            return Ok(Command::Delete {
                name: required("delete", name)?,
                yes: flag(cli_args, "yes"),
            });
        }
        Ok(Command::List)
    }
}

/// Parse `--key=value` and `--flag` arguments into a map
pub fn parse_args<I>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = HashMap::new();
    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }
    cli_args
}

// a bare `--deploy` parses as "true", which is never a meaningful value
fn required(key: &str, value: &str) -> Result<String, ConsoleError> {
    if value.is_empty() || value == "true" {
        return Err(ConsoleError::ConfigError(format!("--{} requires a value", key)));
    }
    Ok(value.to_string())
}

fn flag(cli_args: &HashMap<String, String>, key: &str) -> bool {
    matches!(cli_args.get(key).map(String::as_str), Some("true") | Some("1") | Some("yes"))
}
