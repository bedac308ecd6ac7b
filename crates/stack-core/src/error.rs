use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("repos.yaml not found at {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("unknown repository: {0}")]
    UnknownRepo(String),

    #[error("repository '{key}' not found at {}; run 'stack clone' first", .path.display())]
    RepoNotCloned { key: String, path: PathBuf },

    #[error("unknown service: {name} (valid services: {valid})")]
    UnknownService { name: String, valid: String },

    #[error("could not find current sprint file: expected exactly one file matching state/sprint-*.md")]
    SprintNotFound,

    #[error("template not found at {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("--work-item must be a number between 1 and 99, got {0}")]
    WorkItemOutOfRange(u32),

    #[error("could not find '### WI-{number}' followed by a 'Repo: <name>' line in {}", .sprint.display())]
    WorkItemNotFound { number: String, sprint: PathBuf },

    #[error("failed to run {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("http request failed: {0}")]
    Http(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StackError>;
