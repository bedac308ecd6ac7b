//! Cloning of configured repositories that are not on disk yet.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::runner::{CommandExecutor, Execution};

pub const CLONE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneStatus {
    AlreadyExists,
    Cloned,
    Failed(String),
}

impl CloneStatus {
    pub fn label(&self) -> String {
        match self {
            CloneStatus::AlreadyExists => "Already exists".to_string(),
            CloneStatus::Cloned => "Cloned".to_string(),
            CloneStatus::Failed(reason) => format!("Failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRow {
    pub key: String,
    pub status: CloneStatus,
    pub path: PathBuf,
}

/// Clone every missing repository, in config order. A failed clone is
/// recorded and the loop continues.
///
/// `on_clone` is called with the key just before each `git clone` starts.
pub fn clone_missing(
    config: &Config,
    root: &Path,
    executor: &dyn CommandExecutor,
    mut on_clone: impl FnMut(&str),
) -> Vec<CloneRow> {
    let mut rows = Vec::with_capacity(config.repos.len());

    for repo in &config.repos {
        let path = repo.resolve(root);
        let status = if path.exists() {
            CloneStatus::AlreadyExists
        } else if let Some(url) = repo.url.as_deref() {
            on_clone(&repo.key);
            clone_one(executor, root, url, &path)
        } else {
            CloneStatus::Failed("no url configured".to_string())
        };
        rows.push(CloneRow {
            key: repo.key.clone(),
            status,
            path,
        });
    }

    rows
}

fn clone_one(executor: &dyn CommandExecutor, root: &Path, url: &str, path: &Path) -> CloneStatus {
    let argv = vec![
        "git".to_string(),
        "clone".to_string(),
        url.to_string(),
        path.display().to_string(),
    ];
    match executor.execute(&argv, root, CLONE_TIMEOUT) {
        Execution::Exited { code: Some(0), .. } => CloneStatus::Cloned,
        Execution::Exited { stderr, code, .. } => {
            let stderr = stderr.trim();
            if stderr.is_empty() {
                CloneStatus::Failed(format!("git exited with {code:?}"))
            } else {
                CloneStatus::Failed(stderr.to_string())
            }
        }
        Execution::NotFound => CloneStatus::Failed("git not found on PATH".to_string()),
        Execution::TimedOut => CloneStatus::Failed("timed out".to_string()),
        Execution::SpawnFailed(reason) => CloneStatus::Failed(reason),
    }
}
