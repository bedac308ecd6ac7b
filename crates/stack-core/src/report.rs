//! Per-repository results and the aggregated validation report.

use std::collections::BTreeMap;

use crate::types::{ProjectKind, RepoStatus, Step, StepOutcome};

// ---------------------------------------------------------------------------
// RepositoryResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    pub status: RepoStatus,
    pub kind: Option<ProjectKind>,
    /// Outcomes keyed by step; iteration follows execution order.
    pub steps: BTreeMap<Step, StepOutcome>,
    pub detail: Option<String>,
}

impl RepositoryResult {
    pub fn missing() -> Self {
        Self {
            status: RepoStatus::Missing,
            kind: None,
            steps: BTreeMap::new(),
            detail: Some("Repository not found".to_string()),
        }
    }

    pub fn undetermined() -> Self {
        Self {
            status: RepoStatus::Skipped,
            kind: Some(ProjectKind::Unknown),
            steps: BTreeMap::new(),
            detail: Some("project type undetermined".to_string()),
        }
    }

    /// Build a result from step outcomes: failed iff any step failed or
    /// timed out.
    pub fn from_steps(kind: ProjectKind, steps: BTreeMap<Step, StepOutcome>) -> Self {
        let status = if steps.values().any(|o| o.fails_repo()) {
            RepoStatus::Failed
        } else {
            RepoStatus::Success
        };
        Self {
            status,
            kind: Some(kind),
            steps,
            detail: None,
        }
    }

    pub fn step(&self, step: Step) -> Option<StepOutcome> {
        self.steps.get(&step).copied()
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Quick mode found no changed repositories; nothing was validated.
    pub nothing_changed: bool,
    pub results: Vec<(String, RepositoryResult)>,
}

impl ValidationReport {
    pub fn push(&mut self, key: impl Into<String>, result: RepositoryResult) {
        self.results.push((key.into(), result));
    }

    pub fn get(&self, key: &str) -> Option<&RepositoryResult> {
        self.results
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| s == RepoStatus::Success)
    }

    /// Repositories that failed or were missing.
    pub fn failures(&self) -> usize {
        self.count(RepoStatus::is_failure)
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}/{} passed, {} failed",
            self.succeeded(),
            self.total(),
            self.failures()
        )
    }

    /// Process exit status: 1 when any repository failed or is missing.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_failures())
    }

    fn count(&self, pred: impl Fn(RepoStatus) -> bool) -> usize {
        self.results.iter().filter(|(_, r)| pred(r.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(outcome: StepOutcome) -> BTreeMap<Step, StepOutcome> {
        Step::all().iter().map(|s| (*s, outcome)).collect()
    }

    #[test]
    fn timeout_and_failed_mark_repo_failed_skipped_does_not() {
        let mut steps = all(StepOutcome::Passed);
        steps.insert(Step::Lint, StepOutcome::Skipped);
        assert_eq!(
            RepositoryResult::from_steps(ProjectKind::Uv, steps.clone()).status,
            RepoStatus::Success
        );

        steps.insert(Step::Test, StepOutcome::Timeout);
        assert_eq!(
            RepositoryResult::from_steps(ProjectKind::Uv, steps.clone()).status,
            RepoStatus::Failed
        );

        let mut steps = all(StepOutcome::Passed);
        steps.insert(Step::Build, StepOutcome::Failed);
        assert_eq!(
            RepositoryResult::from_steps(ProjectKind::Just, steps).status,
            RepoStatus::Failed
        );
    }

    #[test]
    fn missing_counts_as_failure_in_summary() {
        let mut report = ValidationReport::default();
        report.push("a", RepositoryResult::from_steps(ProjectKind::Uv, all(StepOutcome::Passed)));
        report.push("b", RepositoryResult::missing());
        assert_eq!(report.summary_line(), "1/2 passed, 1 failed");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn skipped_repo_does_not_fail_the_run() {
        let mut report = ValidationReport::default();
        report.push("a", RepositoryResult::from_steps(ProjectKind::Uv, all(StepOutcome::Passed)));
        report.push("docs", RepositoryResult::undetermined());
        assert_eq!(report.summary_line(), "1/2 passed, 0 failed");
        assert!(!report.has_failures());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn exit_code_tracks_failures_exactly() {
        let mut report = ValidationReport::default();
        assert_eq!(report.exit_code(), 0);
        report.push("x", RepositoryResult::from_steps(ProjectKind::Pnpm, all(StepOutcome::Failed)));
        assert_eq!(report.failures(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn get_looks_up_by_key() {
        let mut report = ValidationReport::default();
        report.push("b", RepositoryResult::missing());
        assert_eq!(report.get("b").unwrap().status, RepoStatus::Missing);
        assert!(report.get("a").is_none());
    }
}
