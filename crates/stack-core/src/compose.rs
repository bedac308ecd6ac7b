//! `docker compose` invocations against the platform stack repository.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Result, StackError};
use crate::paths::{COMPOSE_INFRA, COMPOSE_SERVICES};

/// Captured result of a compose command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// A compose project rooted at the stack repository.
#[derive(Debug, Clone)]
pub struct Compose {
    dir: PathBuf,
    files: Vec<&'static str>,
}

impl Compose {
    /// Application services only.
    pub fn services(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files: vec![COMPOSE_SERVICES],
        }
    }

    /// Application services plus observability infrastructure.
    pub fn with_infra(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files: vec![COMPOSE_SERVICES, COMPOSE_INFRA],
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec!["docker".to_string(), "compose".to_string()];
        for file in &self.files {
            argv.push("-f".to_string());
            argv.push(file.to_string());
        }
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    fn command(&self, args: &[&str]) -> Command {
        let argv = self.argv(args);
        tracing::debug!(command = %argv.join(" "), cwd = %self.dir.display(), "compose");
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]).current_dir(&self.dir);
        cmd
    }

    /// Run and capture stdout/stderr.
    pub fn output(&self, args: &[&str]) -> Result<ComposeOutput> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_error)?;
        Ok(ComposeOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run with the terminal attached so output streams live.
    pub fn stream(&self, args: &[&str]) -> Result<ExitStatus> {
        self.command(args).status().map_err(spawn_error)
    }

    pub fn up(&self) -> Result<ComposeOutput> {
        self.output(&["up", "-d"])
    }

    pub fn down(&self) -> Result<ComposeOutput> {
        self.output(&["down"])
    }

    pub fn ps(&self) -> Result<ComposeOutput> {
        self.output(&["ps"])
    }

    /// True when at least one container of the project is running. Any
    /// failure to ask counts as not running.
    pub fn is_running(&self) -> bool {
        match self.output(&["ps", "-q"]) {
            Ok(out) => !out.stdout.trim().is_empty(),
            Err(e) => {
                tracing::debug!(error = %e, "compose ps failed");
                false
            }
        }
    }
}

/// Arguments after the compose file flags for `logs`.
pub fn logs_args(service: &str, follow: bool) -> Vec<&str> {
    let mut args = vec!["logs"];
    if follow {
        args.push("-f");
    }
    args.push(service);
    args
}

fn spawn_error(e: std::io::Error) -> StackError {
    StackError::SpawnFailed {
        program: "docker".to_string(),
        reason: e.to_string(),
    }
}
