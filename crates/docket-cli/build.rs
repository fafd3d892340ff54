//! Embeds the package version, plus the git description when built from a
//! checkout, as `DOCKET_VERSION`.

use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if let Some(git_dir) = find_git_dir(&manifest_dir) {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("refs").display());
    }

    let package = env!("CARGO_PKG_VERSION");
    let version = match describe(&manifest_dir) {
        Some(commit) if commit.trim_start_matches('v') != package => {
            format!("{} ({})", package, commit)
        }
        _ => package.to_string(),
    };

    println!("cargo:rustc-env=DOCKET_VERSION={}", version);
}

/// The `.git` directory of the checkout containing `start`, if any.
fn find_git_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".git"))
        .find(|candidate| candidate.exists())
}

fn describe(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.to_string())
}
