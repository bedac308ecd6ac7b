use clap::Subcommand;
use stack_core::prompt;
use std::path::Path;
use std::process::ExitCode;

#[derive(Subcommand)]
pub enum PromptSubcommand {
    /// Output the planner prompt
    Plan,
    /// Output the implementer prompt for a work item in the current sprint
    Impl {
        /// Work item number (1-99)
        #[arg(long)]
        work_item: u32,
    },
}

pub fn run(root: &Path, subcmd: PromptSubcommand) -> anyhow::Result<ExitCode> {
    let text = match subcmd {
        PromptSubcommand::Plan => prompt::planner(root)?,
        PromptSubcommand::Impl { work_item } => prompt::implementer(root, work_item)?,
    };
    print!("{text}");
    Ok(ExitCode::SUCCESS)
}
