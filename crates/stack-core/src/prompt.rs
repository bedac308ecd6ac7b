//! Planner and implementer prompts rendered from workspace templates.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Result, StackError};
use crate::paths;
use crate::sprint;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap())
}

/// Substitute `{{ NAME }}` placeholders. Unknown names are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn read_template(path: PathBuf) -> Result<String> {
    if !path.exists() {
        return Err(StackError::TemplateNotFound(path));
    }
    Ok(std::fs::read_to_string(&path)?)
}

/// The planner prompt, verbatim.
pub fn planner(root: &Path) -> Result<String> {
    read_template(paths::planner_template(root))
}

/// Two-digit work item number; valid items are 1..=99.
pub fn work_item_number(work_item: u32) -> Result<String> {
    if !(1..=99).contains(&work_item) {
        return Err(StackError::WorkItemOutOfRange(work_item));
    }
    Ok(format!("{work_item:02}"))
}

/// The implementer prompt for `work_item`, with the repository taken from
/// the current sprint file.
pub fn implementer(root: &Path, work_item: u32) -> Result<String> {
    let number = work_item_number(work_item)?;
    let sprint_path = sprint::current_sprint(root)?;
    let content = std::fs::read_to_string(&sprint_path)?;

    let repo = sprint::repo_for_work_item(&content, &number).ok_or_else(|| {
        StackError::WorkItemNotFound {
            number: number.clone(),
            sprint: sprint_path
                .strip_prefix(root)
                .unwrap_or(&sprint_path)
                .to_path_buf(),
        }
    })?;

    let template = read_template(paths::implementer_template(root))?;
    Ok(render(
        &template,
        &[("WI_NUMBER", number.as_str()), ("REPO_NAME", repo.as_str())],
    ))
}
