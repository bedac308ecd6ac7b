//! Subprocess execution with a wall-clock bound, and the step runner that
//! classifies an execution into a [`StepOutcome`].
//!
//! [`CommandExecutor`] is the seam between the validation engine and the
//! operating system. [`ProcessExecutor`] is the real implementation; tests
//! substitute a scripted executor.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::types::StepOutcome;

/// Bound applied to every validation step.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Raw result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The process ran to completion. `code` is `None` when it was killed by
    /// a signal.
    Exited {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The executable is not on the search path.
    NotFound,
    /// The wall-clock bound elapsed; the process was terminated.
    TimedOut,
    /// The process could not be started for any other reason.
    SpawnFailed(String),
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        matches!(self, Execution::Exited { code: Some(0), .. })
    }
}

pub trait CommandExecutor {
    /// Run `argv` in `cwd`, capturing stdout and stderr, for at most `timeout`.
    fn execute(&self, argv: &[String], cwd: &Path, timeout: Duration) -> Execution;
}

// ---------------------------------------------------------------------------
// ProcessExecutor
// ---------------------------------------------------------------------------

/// Spawns real processes on a private current-thread tokio runtime.
///
/// Commands run strictly one at a time; the runtime exists only to race the
/// child against a timer and to kill it when the timer wins.
pub struct ProcessExecutor {
    runtime: tokio::runtime::Runtime,
}

impl ProcessExecutor {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, argv: &[String], cwd: &Path, timeout: Duration) -> Execution {
        let Some((program, args)) = argv.split_first() else {
            return Execution::SpawnFailed("empty command".to_string());
        };

        let resolved = match which::which_in(program, std::env::var_os("PATH"), cwd) {
            Ok(path) => path,
            Err(_) => {
                tracing::debug!(program = %program, "executable not found on PATH");
                return Execution::NotFound;
            }
        };

        tracing::debug!(command = %argv.join(" "), cwd = %cwd.display(), "running");
        let started = Instant::now();

        let mut cmd = tokio::process::Command::new(&resolved);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down the tools the step
        // started as well as the step itself.
        #[cfg(unix)]
        cmd.process_group(0);

        let execution = self.runtime.block_on(async move {
            let child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Execution::NotFound,
                Err(e) => return Execution::SpawnFailed(e.to_string()),
            };
            let pid = child.id();
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => Execution::Exited {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
                Ok(Err(e)) => Execution::SpawnFailed(e.to_string()),
                Err(_) => {
                    if let Some(pid) = pid {
                        kill_process_group(pid);
                    }
                    Execution::TimedOut
                }
            }
        });

        tracing::debug!(
            command = %argv.join(" "),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished"
        );
        execution
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let target = format!("-{pid}");
    let result = std::process::Command::new("kill")
        .args(["-KILL", "--", target.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::debug!(pid, ?status, "process group already gone"),
        Err(e) => tracing::warn!(pid, error = %e, "failed to kill process group"),
    }
}

// Dropping the child (kill_on_drop) is all there is off unix.
#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

// ---------------------------------------------------------------------------
// StepRunner
// ---------------------------------------------------------------------------

/// Classified result of one validation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRun {
    Passed,
    Failed { stdout: String, stderr: String },
    /// The tool is not installed. Recorded as skipped, never as a pass.
    ToolMissing { program: String },
    TimedOut,
}

impl StepRun {
    pub fn outcome(&self) -> StepOutcome {
        match self {
            StepRun::Passed => StepOutcome::Passed,
            StepRun::Failed { .. } => StepOutcome::Failed,
            StepRun::ToolMissing { .. } => StepOutcome::Skipped,
            StepRun::TimedOut => StepOutcome::Timeout,
        }
    }
}

/// Runs one step with a single attempt; never retries.
pub struct StepRunner<'a> {
    executor: &'a dyn CommandExecutor,
    timeout: Duration,
}

impl<'a> StepRunner<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn run(&self, argv: &[String], cwd: &Path) -> StepRun {
        match self.executor.execute(argv, cwd, self.timeout) {
            Execution::Exited { code: Some(0), .. } => StepRun::Passed,
            Execution::Exited { stdout, stderr, .. } => StepRun::Failed { stdout, stderr },
            Execution::NotFound => StepRun::ToolMissing {
                program: argv.first().cloned().unwrap_or_default(),
            },
            Execution::TimedOut => StepRun::TimedOut,
            Execution::SpawnFailed(reason) => StepRun::Failed {
                stdout: String::new(),
                stderr: reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Returns one canned execution and records what was asked.
    struct Canned {
        result: Execution,
        seen: RefCell<Vec<(Vec<String>, Duration)>>,
    }

    impl Canned {
        fn new(result: Execution) -> Self {
            Self {
                result,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandExecutor for Canned {
        fn execute(&self, argv: &[String], _cwd: &Path, timeout: Duration) -> Execution {
            self.seen.borrow_mut().push((argv.to_vec(), timeout));
            self.result.clone()
        }
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zero_exit_passes() {
        let exec = Canned::new(Execution::Exited {
            code: Some(0),
            stdout: "ok".into(),
            stderr: String::new(),
        });
        let runner = StepRunner::new(&exec, STEP_TIMEOUT);
        let run = runner.run(&argv(&["just", "build"]), Path::new("."));
        assert_eq!(run, StepRun::Passed);
        assert_eq!(exec.seen.borrow()[0].1, Duration::from_secs(300));
    }

    #[test]
    fn nonzero_exit_fails_with_output() {
        let exec = Canned::new(Execution::Exited {
            code: Some(2),
            stdout: "3 errors".into(),
            stderr: "boom".into(),
        });
        let run = StepRunner::new(&exec, STEP_TIMEOUT).run(&argv(&["pnpm", "lint"]), Path::new("."));
        assert_eq!(
            run,
            StepRun::Failed {
                stdout: "3 errors".into(),
                stderr: "boom".into()
            }
        );
        assert_eq!(run.outcome(), StepOutcome::Failed);
    }

    #[test]
    fn killed_by_signal_fails() {
        let exec = Canned::new(Execution::Exited {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        });
        let run = StepRunner::new(&exec, STEP_TIMEOUT).run(&argv(&["x"]), Path::new("."));
        assert_eq!(run.outcome(), StepOutcome::Failed);
    }

    #[test]
    fn missing_tool_is_skipped_not_failed() {
        let exec = Canned::new(Execution::NotFound);
        let run = StepRunner::new(&exec, STEP_TIMEOUT).run(&argv(&["uv", "sync"]), Path::new("."));
        assert_eq!(
            run,
            StepRun::ToolMissing {
                program: "uv".into()
            }
        );
        assert_eq!(run.outcome(), StepOutcome::Skipped);
    }

    #[test]
    fn timeout_is_its_own_outcome() {
        let exec = Canned::new(Execution::TimedOut);
        let run = StepRunner::new(&exec, STEP_TIMEOUT).run(&argv(&["just", "test"]), Path::new("."));
        assert_eq!(run.outcome(), StepOutcome::Timeout);
    }

    #[test]
    fn spawn_failure_surfaces_reason_as_stderr() {
        let exec = Canned::new(Execution::SpawnFailed("permission denied".into()));
        let run = StepRunner::new(&exec, STEP_TIMEOUT).run(&argv(&["./x"]), Path::new("."));
        match run {
            StepRun::Failed { stderr, .. } => assert_eq!(stderr, "permission denied"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn exec() -> ProcessExecutor {
            ProcessExecutor::new().unwrap()
        }

        #[test]
        fn captures_exit_code_and_streams() {
            let dir = TempDir::new().unwrap();
            let result = exec().execute(
                &argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
                dir.path(),
                Duration::from_secs(30),
            );
            assert_eq!(
                result,
                Execution::Exited {
                    code: Some(3),
                    stdout: "out\n".into(),
                    stderr: "err\n".into(),
                }
            );
        }

        #[test]
        fn runs_in_requested_directory() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("marker.txt"), "").unwrap();
            let result = exec().execute(
                &argv(&["ls"]),
                dir.path(),
                Duration::from_secs(30),
            );
            assert!(result.succeeded());
            match result {
                Execution::Exited { stdout, .. } => assert!(stdout.contains("marker.txt")),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn unknown_program_is_not_found() {
            let dir = TempDir::new().unwrap();
            let result = exec().execute(
                &argv(&["definitely-not-a-real-tool-8d1f"]),
                dir.path(),
                Duration::from_secs(30),
            );
            assert_eq!(result, Execution::NotFound);
        }

        #[test]
        fn slow_command_times_out() {
            let dir = TempDir::new().unwrap();
            let started = Instant::now();
            let result = exec().execute(
                &argv(&["sleep", "10"]),
                dir.path(),
                Duration::from_millis(200),
            );
            assert_eq!(result, Execution::TimedOut);
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[cfg(target_os = "linux")]
        #[test]
        fn timeout_kills_grandchildren() {
            let dir = TempDir::new().unwrap();
            let result = exec().execute(
                &argv(&["sh", "-c", "sleep 30 & echo $! > sleeper.pid; wait"]),
                dir.path(),
                Duration::from_millis(500),
            );
            assert_eq!(result, Execution::TimedOut);

            let pid = std::fs::read_to_string(dir.path().join("sleeper.pid")).unwrap();
            let stat = format!("/proc/{}/stat", pid.trim());
            // Gone, or a zombie waiting to be reaped.
            let deadline = Instant::now() + Duration::from_secs(5);
            let dead = loop {
                match std::fs::read_to_string(&stat) {
                    Err(_) => break true,
                    Ok(s) if s.contains(") Z ") => break true,
                    Ok(_) if Instant::now() > deadline => break false,
                    Ok(_) => std::thread::sleep(Duration::from_millis(50)),
                }
            };
            assert!(dead, "grandchild {} still running", pid.trim());
        }

        #[test]
        fn empty_command_is_a_spawn_failure() {
            let dir = TempDir::new().unwrap();
            let result = exec().execute(&[], dir.path(), Duration::from_secs(1));
            assert!(matches!(result, Execution::SpawnFailed(_)));
        }
    }
}
