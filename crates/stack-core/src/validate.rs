//! The validation engine: select the working set, then detect, select a
//! pipeline and run every step for each repository in turn.
//!
//! Output goes to a caller-supplied [`Reporter`]; the engine itself never
//! prints and never decides the process exit status.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::changes::changed_repos;
use crate::config::Config;
use crate::detect::detect_kind;
use crate::error::Result;
use crate::pipeline::steps_for;
use crate::report::{RepositoryResult, ValidationReport};
use crate::runner::{CommandExecutor, StepRun, StepRunner, STEP_TIMEOUT};
use crate::types::{ProjectKind, Step, StepOutcome};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only repositories with uncommitted changes.
    Quick,
    /// Every configured repository.
    Full,
}

impl Mode {
    /// Quick is the default, so only `--full` decides; it wins even when
    /// `--quick` is also given.
    pub fn from_full_flag(full: bool) -> Self {
        if full {
            Mode::Full
        } else {
            Mode::Quick
        }
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Progress emitted while validating, in the order it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationEvent<'a> {
    Started { mode: Mode },
    NothingChanged,
    ChangedRepos { keys: &'a [String] },
    RepoStarted { key: &'a str },
    RepoMissing { key: &'a str, path: &'a Path },
    KindDetected { key: &'a str, kind: ProjectKind },
    KindUndetermined { key: &'a str },
    /// Skipped by pipeline policy.
    StepSkipped { step: Step },
    StepRunning { step: Step },
    StepPassed { step: Step },
    StepFailed {
        step: Step,
        stdout: &'a str,
        stderr: &'a str,
    },
    StepTimedOut { step: Step, timeout: Duration },
    StepToolMissing { step: Step, program: &'a str },
}

pub trait Reporter {
    fn event(&mut self, event: ValidationEvent<'_>);
}

/// Discards every event.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn event(&mut self, _event: ValidationEvent<'_>) {}
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

pub struct Validator<'a> {
    root: &'a Path,
    config: &'a Config,
    executor: &'a dyn CommandExecutor,
    step_timeout: Duration,
}

impl<'a> Validator<'a> {
    pub fn new(root: &'a Path, config: &'a Config, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            root,
            config,
            executor,
            step_timeout: STEP_TIMEOUT,
        }
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Validate the working set selected by `mode`.
    ///
    /// Only configuration errors are returned as `Err`; per-repository and
    /// per-step problems are recorded in the report.
    pub fn run(&self, mode: Mode, reporter: &mut dyn Reporter) -> Result<ValidationReport> {
        reporter.event(ValidationEvent::Started { mode });

        let keys = match mode {
            Mode::Full => self.config.keys(),
            Mode::Quick => {
                let changed = changed_repos(self.config, self.root, self.executor);
                if changed.is_empty() {
                    reporter.event(ValidationEvent::NothingChanged);
                    return Ok(ValidationReport {
                        nothing_changed: true,
                        results: Vec::new(),
                    });
                }
                reporter.event(ValidationEvent::ChangedRepos { keys: &changed });
                changed
            }
        };

        self.run_keys(&keys, reporter)
    }

    /// Validate an explicit list of repository keys, in the given order.
    pub fn run_keys(&self, keys: &[String], reporter: &mut dyn Reporter) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        for key in keys {
            let result = self.validate_repo(key, reporter)?;
            report.push(key.clone(), result);
        }
        Ok(report)
    }

    pub fn validate_repo(&self, key: &str, reporter: &mut dyn Reporter) -> Result<RepositoryResult> {
        let path = self.config.repo_path(self.root, key)?;

        if !path.exists() {
            reporter.event(ValidationEvent::RepoMissing { key, path: &path });
            return Ok(RepositoryResult::missing());
        }

        reporter.event(ValidationEvent::RepoStarted { key });

        let kind = detect_kind(&path);
        let steps = steps_for(kind);
        if steps.is_empty() {
            reporter.event(ValidationEvent::KindUndetermined { key });
            return Ok(RepositoryResult::undetermined());
        }
        reporter.event(ValidationEvent::KindDetected { key, kind });

        let runner = StepRunner::new(self.executor, self.step_timeout);
        let mut outcomes = BTreeMap::new();

        // Every step runs even when an earlier one failed.
        for step in steps {
            let Some(argv) = step.command else {
                reporter.event(ValidationEvent::StepSkipped { step: step.step });
                outcomes.insert(step.step, StepOutcome::Skipped);
                continue;
            };

            reporter.event(ValidationEvent::StepRunning { step: step.step });
            let run = runner.run(&argv, &path);
            match &run {
                StepRun::Passed => reporter.event(ValidationEvent::StepPassed { step: step.step }),
                StepRun::Failed { stdout, stderr } => reporter.event(ValidationEvent::StepFailed {
                    step: step.step,
                    stdout,
                    stderr,
                }),
                StepRun::ToolMissing { program } => {
                    reporter.event(ValidationEvent::StepToolMissing {
                        step: step.step,
                        program,
                    })
                }
                StepRun::TimedOut => reporter.event(ValidationEvent::StepTimedOut {
                    step: step.step,
                    timeout: runner.timeout(),
                }),
            }
            outcomes.insert(step.step, run.outcome());
        }

        let result = RepositoryResult::from_steps(kind, outcomes);
        tracing::info!(repo = key, status = %result.status, "validated");
        Ok(result)
    }
}
