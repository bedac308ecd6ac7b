use anyhow::Context;
use stack_core::compose::{logs_args, Compose};
use stack_core::config::Config;
use std::path::Path;
use std::process::ExitCode;

pub fn run(root: &Path, service: &str, follow: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load(root).context("failed to load config")?;
    let compose_service = config.service(service)?;
    let stack = config.stack_path(root)?;

    let compose = Compose::services(&stack);
    let args = logs_args(compose_service, follow);
    println!(
        "Running: {} (in {})",
        compose.argv(&args).join(" "),
        stack.display()
    );
    println!();

    let status = compose.stream(&args).context("failed to view logs")?;
    tracing::debug!(?status, "logs exited");
    Ok(ExitCode::SUCCESS)
}
