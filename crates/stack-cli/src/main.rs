mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::prompt::PromptSubcommand;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "stack",
    about = "Stack management CLI for the platform workspace",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Workspace root (default: nearest directory containing repos.yaml)
    #[arg(long, global = true, env = "STACK_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone all repositories defined in repos.yaml
    Clone,

    /// Start the stack using docker compose
    Up {
        /// Include observability infrastructure
        #[arg(long)]
        with_observability: bool,
    },

    /// Stop the stack using docker compose
    Down,

    /// Validate repositories by running build/format/lint/test
    Validate {
        /// Run validation only on changed repos (default)
        #[arg(long)]
        quick: bool,

        /// Run validation on all repos (wins over --quick)
        #[arg(long)]
        full: bool,
    },

    /// Run a smoke test of the entire stack
    Smoke,

    /// View docker compose logs for a service
    Logs {
        /// Service to view logs for (e.g. pcp, aisp, uip)
        service: String,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },

    /// Archive the current sprint file and create a new one from the template
    NewSprint {
        /// Name of the sprint (e.g. 'foo' for sprint-foo-<timestamp>.md)
        sprint_name: String,
    },

    /// Output planner or implementer prompt from templates
    Prompt {
        #[command(subcommand)]
        subcommand: PromptSubcommand,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Clone => cmd::clone::run(&root),
        Commands::Up { with_observability } => cmd::stack::up(&root, with_observability),
        Commands::Down => cmd::stack::down(&root),
        Commands::Validate { quick, full } => cmd::validate::run(&root, quick, full),
        Commands::Smoke => cmd::smoke::run(&root),
        Commands::Logs { service, follow } => cmd::logs::run(&root, &service, follow),
        Commands::NewSprint { sprint_name } => cmd::sprint::run(&root, &sprint_name),
        Commands::Prompt { subcommand } => cmd::prompt::run(&root, subcommand),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
