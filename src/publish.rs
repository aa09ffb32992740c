//! Committing generated pages and pushing them to a git remote.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::environment::PublishConfig;
use crate::prompt::display_date;
use crate::TARGET_PUBLISH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PublishStatus {
    Skipped,
    Pushed,
    Failed(String),
}

/// Add, commit and push `files`. Never returns an error: failures are logged
/// and reported in the status, and the files stay where they were written.
pub async fn publish(config: Option<&PublishConfig>, files: &[PathBuf], date: NaiveDate) -> PublishStatus {
    let Some(config) = config else {
        info!(target: TARGET_PUBLISH, "Publishing disabled, leaving pages in place");
        return PublishStatus::Skipped;
    };

    match push_files(config, files, date).await {
        Ok(()) => {
            info!(target: TARGET_PUBLISH, " ** Pushed {} file(s) to {} ({})", files.len(), config.remote, config.branch);
            PublishStatus::Pushed
        }
        Err(reason) => {
            let reason = redact(&reason, &config.token);
            error!(target: TARGET_PUBLISH, " !! Error publishing newsletter: {}", reason);
            PublishStatus::Failed(reason)
        }
    }
}

async fn push_files(config: &PublishConfig, files: &[PathBuf], date: NaiveDate) -> Result<(), String> {
    // git runs inside the repository, so relative paths must not leak through
    let mut add = vec!["add".to_string(), "--".to_string()];
    for file in files {
        let path = tokio::fs::canonicalize(file)
            .await
            .unwrap_or_else(|_| file.clone());
        add.push(path.display().to_string());
    }
    run_git(&config.repo_path, &add).await?;

    let message = commit_message(date);
    run_git(
        &config.repo_path,
        &["commit".to_string(), "-m".to_string(), message],
    )
    .await?;

    run_git(
        &config.repo_path,
        &[
            "push".to_string(),
            authenticated_remote(&config.remote, &config.token),
            config.branch.clone(),
        ],
    )
    .await
}

async fn run_git(repo: &Path, args: &[String]) -> Result<(), String> {
    debug!(target: TARGET_PUBLISH, "Running git {} in {}", args.first().map(String::as_str).unwrap_or(""), repo.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .await
        .map_err(|e| format!("failed to run git {}: {}", args.join(" "), e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "git {} exited with {}: {}",
            args.first().map(String::as_str).unwrap_or(""),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

pub fn commit_message(date: NaiveDate) -> String {
    format!("Auto-generated newsletter for {}", display_date(date))
}

/// `https://<token>@<remote>`. A scheme already present on `remote` is dropped.
pub fn authenticated_remote(remote: &str, token: &str) -> String {
    let bare = remote
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    format!("https://{}@{}", token, bare)
}

/// Hide every occurrence of `secret` in `text`.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}
