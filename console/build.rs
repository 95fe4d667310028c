//! Build metadata for `pubconsole --version`

use std::env;
use std::process::Command;

use chrono::Utc;

/// Release tarballs have no checkout; packagers set the hash here instead
const HASH_OVERRIDE: &str = "PUBCONSOLE_GIT_HASH";

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let git_hash = env::var(HASH_OVERRIDE)
        .ok()
        .filter(|hash| !hash.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=8"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );

    // The checkout is the workspace root, one level up
    println!("cargo:rerun-if-env-changed={}", HASH_OVERRIDE);
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
