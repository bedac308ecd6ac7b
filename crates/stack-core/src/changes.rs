//! Uncommitted-change detection for quick validation.

use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::runner::{CommandExecutor, Execution};

/// Bound on a single `git status` query.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(60);

fn status_argv() -> Vec<String> {
    ["git", "status", "--porcelain"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Keys of repositories with uncommitted changes, in config order.
///
/// Repositories whose path does not exist, or where the status query does not
/// exit cleanly, are left out rather than aborting the scan.
pub fn changed_repos(config: &Config, root: &Path, executor: &dyn CommandExecutor) -> Vec<String> {
    let argv = status_argv();
    let mut changed = Vec::new();

    for repo in &config.repos {
        let path = repo.resolve(root);
        if !path.exists() {
            continue;
        }
        match executor.execute(&argv, &path, STATUS_TIMEOUT) {
            Execution::Exited {
                code: Some(0),
                stdout,
                ..
            } => {
                if !stdout.trim().is_empty() {
                    changed.push(repo.key.clone());
                }
            }
            other => {
                tracing::debug!(repo = %repo.key, result = ?other, "git status unavailable; skipping");
            }
        }
    }

    changed
}
