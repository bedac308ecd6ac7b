use anyhow::Context;
use stack_core::compose::Compose;
use stack_core::config::Config;
use std::path::Path;
use std::process::ExitCode;

pub fn up(root: &Path, with_observability: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load(root).context("failed to load config")?;
    let stack = config.stack_path(root)?;

    let compose = if with_observability {
        println!("Starting stack with observability...");
        Compose::with_infra(&stack)
    } else {
        println!("Starting stack...");
        Compose::services(&stack)
    };

    let out = compose.up().context("failed to start stack")?;
    if !out.success {
        eprintln!("Failed to start stack:");
        eprint!("{}", out.stderr);
        return Ok(ExitCode::FAILURE);
    }

    println!("Stack started successfully!");
    print_nonempty(&out.stdout);
    print_state(&stack);
    Ok(ExitCode::SUCCESS)
}

pub fn down(root: &Path) -> anyhow::Result<ExitCode> {
    let config = Config::load(root).context("failed to load config")?;
    let stack = config.stack_path(root)?;

    // Include the infra file so observability containers come down too.
    let compose = Compose::with_infra(&stack);

    println!("Stopping stack...");
    let out = compose.down().context("failed to stop stack")?;
    if !out.success {
        eprintln!("Failed to stop stack:");
        eprint!("{}", out.stderr);
        return Ok(ExitCode::FAILURE);
    }

    println!("Stack stopped successfully!");
    print_nonempty(&out.stdout);
    print_state(&stack);
    Ok(ExitCode::SUCCESS)
}

fn print_state(stack: &Path) {
    println!();
    println!("Stack State:");
    match Compose::services(stack).ps() {
        Ok(ps) if ps.success => {
            if ps.stdout.trim().is_empty() {
                println!("No running containers.");
            } else {
                print!("{}", ps.stdout);
            }
        }
        Ok(ps) => eprintln!("Could not get stack state: {}", ps.stderr.trim()),
        Err(e) => eprintln!("Could not get stack state: {e}"),
    }
}

fn print_nonempty(text: &str) {
    if !text.trim().is_empty() {
        print!("{text}");
    }
}
