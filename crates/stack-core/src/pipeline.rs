//! Per-kind validation pipelines.

use crate::types::{ProjectKind, Step};

/// A pipeline entry. `command == None` means the step is skipped by policy
/// for this project kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationStep {
    pub step: Step,
    pub command: Option<Vec<String>>,
}

impl ValidationStep {
    fn run(step: Step, argv: &[&str]) -> Self {
        Self {
            step,
            command: Some(argv.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn skip(step: Step) -> Self {
        Self {
            step,
            command: None,
        }
    }
}

/// Ordered steps (build, format, lint, test) for `kind`. Empty for `Unknown`.
pub fn steps_for(kind: ProjectKind) -> Vec<ValidationStep> {
    match kind {
        ProjectKind::Uv => vec![
            ValidationStep::run(Step::Build, &["uv", "sync"]),
            ValidationStep::run(Step::Format, &["uv", "run", "ruff", "format", "--check", "."]),
            ValidationStep::run(Step::Lint, &["uv", "run", "ruff", "check", "."]),
            ValidationStep::run(Step::Test, &["uv", "run", "pytest", "-q"]),
        ],
        ProjectKind::Just => vec![
            ValidationStep::run(Step::Build, &["just", "build"]),
            ValidationStep::run(Step::Format, &["just", "fmt"]),
            ValidationStep::run(Step::Lint, &["just", "lint"]),
            ValidationStep::run(Step::Test, &["just", "test"]),
        ],
        ProjectKind::Pnpm => vec![
            ValidationStep::run(Step::Build, &["pnpm", "build"]),
            ValidationStep::skip(Step::Format),
            ValidationStep::run(Step::Lint, &["pnpm", "lint"]),
            ValidationStep::skip(Step::Test),
        ],
        ProjectKind::Unknown => Vec::new(),
    }
}
