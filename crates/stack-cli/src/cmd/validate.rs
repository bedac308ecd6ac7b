use crate::output::print_validation_report;
use anyhow::Context;
use stack_core::config::Config;
use stack_core::runner::ProcessExecutor;
use stack_core::validate::{Mode, Reporter, ValidationEvent, Validator};
use std::path::Path;
use std::process::ExitCode;

pub fn run(root: &Path, quick: bool, full: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load(root).context("failed to load config")?;
    let executor = ProcessExecutor::new().context("failed to start process runtime")?;

    if quick && full {
        tracing::debug!("--full overrides --quick");
    }
    let mode = Mode::from_full_flag(full);
    let report = Validator::new(root, &config, &executor).run(mode, &mut ConsoleReporter)?;

    if report.nothing_changed {
        return Ok(ExitCode::SUCCESS);
    }

    print_validation_report(&report);
    Ok(ExitCode::from(report.exit_code()))
}

/// Prints progress as the engine reports it.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn event(&mut self, event: ValidationEvent<'_>) {
        match event {
            ValidationEvent::Started { mode: Mode::Full } => {
                println!("Running full validation on all repositories...");
            }
            ValidationEvent::Started { mode: Mode::Quick } => {
                println!("Running quick validation on changed repositories...");
            }
            ValidationEvent::NothingChanged => {
                println!("No changed repositories found. Nothing to validate.");
            }
            ValidationEvent::ChangedRepos { keys } => {
                println!("Changed repositories: {}", keys.join(", "));
            }
            ValidationEvent::RepoMissing { key, path } => {
                println!();
                println!("{key}: repository not found at {}", path.display());
            }
            ValidationEvent::RepoStarted { key } => {
                println!();
                println!("Validating {key}...");
            }
            ValidationEvent::KindDetected { kind, .. } => {
                println!("  Detected {kind} project");
            }
            ValidationEvent::KindUndetermined { key } => {
                println!("  Skipping {key}: project type undetermined");
            }
            ValidationEvent::StepSkipped { step } => {
                println!("  {}: skipped", step.as_str());
            }
            ValidationEvent::StepRunning { step } => {
                println!("  Running {}...", step.as_str());
            }
            ValidationEvent::StepPassed { step } => {
                println!("  {}: passed", step.as_str());
            }
            ValidationEvent::StepFailed {
                step,
                stdout,
                stderr,
            } => {
                println!("  {}: failed", step.as_str());
                if !stdout.trim().is_empty() {
                    println!("{}", stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    eprintln!("{}", stderr.trim_end());
                }
            }
            ValidationEvent::StepTimedOut { step, timeout } => {
                println!("  {}: timed out after {}s", step.as_str(), timeout.as_secs());
            }
            ValidationEvent::StepToolMissing { step, program } => {
                println!("  {}: skipped ({program} not found)", step.as_str());
            }
        }
    }
}
