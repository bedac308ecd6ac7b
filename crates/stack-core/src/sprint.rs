//! Sprint files under `state/`: lookup, rotation and work-item parsing.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{Result, StackError};
use crate::paths;

/// Timestamp suffix of a newly created sprint file.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

fn is_sprint_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("sprint-") && n.ends_with(".md"))
}

/// The single `state/sprint-*.md` file. Zero or several is an error.
pub fn current_sprint(root: &Path) -> Result<PathBuf> {
    let state = paths::state_dir(root);
    if !state.is_dir() {
        return Err(StackError::SprintNotFound);
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(&state)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_sprint_file(p))
        .collect();
    if candidates.len() != 1 {
        tracing::debug!(count = candidates.len(), "expected exactly one sprint file");
        return Err(StackError::SprintNotFound);
    }
    Ok(candidates.remove(0))
}

/// Paths touched by [`rotate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub archived: PathBuf,
    pub created: PathBuf,
}

/// Move the current sprint file to `state/archive/` and start
/// `state/sprint-<name>-<timestamp>.md` from the sprint template.
///
/// Nothing is moved unless both the current sprint and the template exist.
pub fn rotate(root: &Path, name: &str, now: DateTime<Utc>) -> Result<Rotation> {
    let current = current_sprint(root)?;

    let template = paths::sprint_template(root);
    if !template.exists() {
        return Err(StackError::TemplateNotFound(template));
    }

    let archive = paths::archive_dir(root);
    std::fs::create_dir_all(&archive)?;

    let file_name = current
        .file_name()
        .ok_or(StackError::SprintNotFound)?
        .to_owned();
    let archived = archive.join(file_name);
    std::fs::rename(&current, &archived)?;

    let created = paths::state_dir(root).join(format!(
        "sprint-{name}-{}.md",
        now.format(TIMESTAMP_FORMAT)
    ));
    std::fs::copy(&template, &created)?;

    Ok(Rotation { archived, created })
}

static REPO_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn repo_line_re() -> &'static Regex {
    REPO_LINE_RE.get_or_init(|| Regex::new(r"(?i)^-?\s*Repo:\s*(.+)$").unwrap())
}

/// Repository named on the line after `### WI-<number>` in `content`.
///
/// The line must look like `- Repo: <name>` (leading dash optional, case
/// insensitive).
pub fn repo_for_work_item(content: &str, number: &str) -> Option<String> {
    let header = format!("### WI-{number}");
    let start = content.find(&header)?;
    let mut lines = content[start..].lines();
    lines.next()?;
    let repo_line = lines.next()?.trim();
    let caps = repo_line_re().captures(repo_line)?;
    Some(caps[1].trim().to_string())
}
