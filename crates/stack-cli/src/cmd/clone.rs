use crate::output::print_table;
use anyhow::Context;
use stack_core::clone::{clone_missing, CloneStatus};
use stack_core::config::Config;
use stack_core::paths;
use stack_core::runner::ProcessExecutor;
use std::path::Path;
use std::process::ExitCode;

pub fn run(root: &Path) -> anyhow::Result<ExitCode> {
    let config = Config::load(root).context("failed to load config")?;
    let executor = ProcessExecutor::new().context("failed to start process runtime")?;

    let rows = clone_missing(&config, root, &executor, |key| {
        println!("Cloning {key}...");
    });

    let failed = rows
        .iter()
        .any(|row| matches!(row.status, CloneStatus::Failed(_)));

    println!();
    print_table(
        &["Repository", "Status", "Path"],
        rows.into_iter()
            .map(|row| {
                vec![
                    row.key,
                    row.status.label(),
                    paths::relative_display(root, &row.path),
                ]
            })
            .collect(),
    );

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
