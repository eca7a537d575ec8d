// ABOUTME: Entry point for the cfstack CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use cfstack::appstack::AppStack;
use cfstack::deploy::{DeployOptions, DryRunDriver, deploy_appstack};
use cfstack::error::Result;
use cfstack::manifest::read_manifests;
use cfstack::order::{self, DependencyGraph};
use cfstack::output::{Output, OutputMode};
use clap::Parser;
use cli::{Cli, Commands, StackArgs};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli.command, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &mut Output) -> Result<()> {
    output.start_timer();
    match command {
        Commands::Validate { stack } => {
            let stack = load_stack(&stack)?;
            let plan = order::plan(&stack)?;
            output.success(&format!(
                "appstack is valid: {} apps in {} waves",
                stack.apps.len(),
                plan.waves.len()
            ));
            Ok(())
        }
        Commands::Expand {
            stack,
            artifacts,
            output: target,
            dump_graph,
        } => {
            let stack = load_stack(&stack)?;
            output.progress(&format!("Reading manifests from {}", artifacts.display()));
            let manifests = read_manifests(&artifacts)?;
            let expanded = order::expand(&stack, &manifests)?;

            if let Some(path) = dump_graph {
                let graph = DependencyGraph::build(&expanded)?;
                order::dump_graph(&graph, &path)?;
                output.progress(&format!("Dependency graph written to {}", path.display()));
            }

            expanded.save(&target)?;
            output.success(&format!("Expanded appstack written to {}", target.display()));
            Ok(())
        }
        Commands::Plan { stack, artifacts } => {
            let stack = merged_stack(&stack, artifacts.as_deref())?;
            let plan = order::plan(&stack)?;
            output.plan(&plan);
            Ok(())
        }
        Commands::DryRun {
            stack,
            artifacts,
            ignore_errors,
            push_strategy,
        } => {
            let stack = merged_stack(&stack, artifacts.as_deref())?;
            let plan = order::plan(&stack)?;

            let driver = DryRunDriver::new();
            let options = DeployOptions {
                ignore_errors,
                strategy: push_strategy,
            };
            let report = deploy_appstack(&plan.stack, &driver, options).await?;
            output.dry_run(&driver.calls(), &report);
            output.success(&format!(
                "Dry run complete: {} apps pushed, {} restarted, {} skipped",
                report.pushed.len(),
                report.restarted.len(),
                report.skipped.len()
            ));
            Ok(())
        }
    }
}

fn load_stack(args: &StackArgs) -> Result<AppStack> {
    match &args.appstack {
        Some(path) => AppStack::load(path),
        None => AppStack::discover(&env::current_dir()?),
    }
}

fn merged_stack(args: &StackArgs, artifacts: Option<&Path>) -> Result<AppStack> {
    let stack = load_stack(args)?;
    match artifacts {
        Some(dir) => Ok(stack.merge_manifests(&read_manifests(dir)?)),
        None => Ok(stack),
    }
}
