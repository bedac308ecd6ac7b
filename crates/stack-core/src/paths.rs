use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Workspace layout constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "repos.yaml";
pub const STATE_DIR: &str = "state";
pub const ARCHIVE_DIR: &str = "state/archive";
pub const SPRINT_TEMPLATE: &str = "templates/sprint.template.md";
pub const PLANNER_TEMPLATE: &str = "templates/prompts/planner.template.md";
pub const IMPLEMENTER_TEMPLATE: &str = "templates/prompts/implementer.template.md";

/// Repository key of the platform stack that owns the compose files.
pub const STACK_REPO: &str = "stack";

pub const COMPOSE_SERVICES: &str = "compose.services.yaml";
pub const COMPOSE_INFRA: &str = "compose.infra.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn archive_dir(root: &Path) -> PathBuf {
    root.join(ARCHIVE_DIR)
}

pub fn sprint_template(root: &Path) -> PathBuf {
    root.join(SPRINT_TEMPLATE)
}

pub fn planner_template(root: &Path) -> PathBuf {
    root.join(PLANNER_TEMPLATE)
}

pub fn implementer_template(root: &Path) -> PathBuf {
    root.join(IMPLEMENTER_TEMPLATE)
}

/// Default relative location of a repository that has no explicit `path`.
pub fn default_repo_path(key: &str) -> String {
    format!("../{key}")
}

/// Join `relative` onto `root` and collapse `.` / `..` components lexically.
///
/// Unlike `canonicalize`, this works for paths that do not exist yet, which
/// is the common case before `stack clone` has run.
pub fn resolve(root: &Path, relative: &str) -> PathBuf {
    let joined = root.join(relative);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the filesystem root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Display `path` relative to `root` when possible.
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
