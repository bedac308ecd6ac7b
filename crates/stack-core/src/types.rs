use std::fmt;

// ---------------------------------------------------------------------------
// ProjectKind
// ---------------------------------------------------------------------------

/// Build tooling ecosystem of a repository, inferred from marker files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    /// Python project managed with `uv` (`pyproject.toml`).
    Uv,
    /// Task-runner project (`justfile`).
    Just,
    /// Node project managed with `pnpm` (`package.json`).
    Pnpm,
    Unknown,
}

impl ProjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectKind::Uv => "uv",
            ProjectKind::Just => "just",
            ProjectKind::Pnpm => "pnpm",
            ProjectKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One validation phase. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Build,
    Format,
    Lint,
    Test,
}

impl Step {
    pub fn all() -> &'static [Step] {
        &[Step::Build, Step::Format, Step::Lint, Step::Test]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Build => "build",
            Step::Format => "format",
            Step::Lint => "lint",
            Step::Test => "test",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed,
    /// Skipped by policy, or the tool is not installed.
    Skipped,
    Timeout,
}

impl StepOutcome {
    /// `Failed` and `Timeout` fail the owning repository; `Skipped` never does.
    pub fn fails_repo(self) -> bool {
        matches!(self, StepOutcome::Failed | StepOutcome::Timeout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepOutcome::Passed => "passed",
            StepOutcome::Failed => "failed",
            StepOutcome::Skipped => "skipped",
            StepOutcome::Timeout => "timeout",
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RepoStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Success,
    Failed,
    /// Project type could not be determined.
    Skipped,
    /// Resolved path does not exist on disk.
    Missing,
}

impl RepoStatus {
    /// Statuses that make the whole run fail.
    pub fn is_failure(self) -> bool {
        matches!(self, RepoStatus::Failed | RepoStatus::Missing)
    }

    pub fn label(self) -> &'static str {
        match self {
            RepoStatus::Success => "Success",
            RepoStatus::Failed => "Failed",
            RepoStatus::Skipped => "Skipped",
            RepoStatus::Missing => "Missing",
        }
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
