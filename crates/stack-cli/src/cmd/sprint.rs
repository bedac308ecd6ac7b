use anyhow::Context;
use stack_core::paths;
use stack_core::sprint;
use std::path::Path;
use std::process::ExitCode;

pub fn run(root: &Path, sprint_name: &str) -> anyhow::Result<ExitCode> {
    let rotation = sprint::rotate(root, sprint_name, chrono::Utc::now())
        .context("failed to start new sprint")?;

    println!(
        "Archived {}",
        paths::relative_display(root, &rotation.archived)
    );
    println!(
        "Created new sprint file: {}",
        paths::relative_display(root, &rotation.created)
    );
    Ok(ExitCode::SUCCESS)
}
