// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use cfstack::deploy::PushStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfstack")]
#[command(about = "Dependency-ordered appstack deployment for Cloud Foundry")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the essential result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct StackArgs {
    /// Appstack file (default: appstack.yml or appstack.yaml in the current directory)
    pub appstack: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the appstack: names, services, cycles and fixed orders
    Validate {
        #[command(flatten)]
        stack: StackArgs,
    },

    /// Merge application manifests into the appstack and sort it
    Expand {
        #[command(flatten)]
        stack: StackArgs,

        /// Directory of unpacked artifacts, one subdirectory per artifact
        #[arg(short, long)]
        artifacts: PathBuf,

        /// Where to write the expanded appstack
        #[arg(short, long, default_value = "expanded_appstack.yml")]
        output: PathBuf,

        /// Also write the dependency graph as GraphML
        #[arg(long)]
        dump_graph: Option<PathBuf>,
    },

    /// Show deployment waves and the final order
    Plan {
        #[command(flatten)]
        stack: StackArgs,

        /// Merge manifests from this artifacts directory first
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// Walk through the deployment without touching a platform
    DryRun {
        #[command(flatten)]
        stack: StackArgs,

        /// Merge manifests from this artifacts directory first
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Turn failed steps into warnings
        #[arg(long)]
        ignore_errors: bool,

        /// When already deployed apps are pushed again
        #[arg(long, value_enum, default_value_t = PushStrategy::Upgrade)]
        push_strategy: PushStrategy,
    },
}
