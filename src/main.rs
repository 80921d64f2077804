//! # neacbuild CLI Entry Point
//!
//! This is the main executable for the `neacbuild` command-line tool.
//! It parses CLI arguments using clap and routes commands to the appropriate handlers.
//!
//! ## Command Structure
//!
//! - `build` (default): compile and link every project
//! - `plan`: show the build order without running anything
//! - `doctor`: check the compiler and source layout
//! - `completions`: print a shell completion script
//!
//! ## Exit Status
//!
//! `0` when every step succeeded, `1` when a step failed or was skipped,
//! `2` for usage and configuration errors.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use neacbuild::build;
use neacbuild::commands;
use neacbuild::config::{BuildSettings, FailurePolicy, Overrides};
use neacbuild::platform::NamingConvention;

#[derive(Parser)]
#[command(name = "neacbuild")]
#[command(about = "Build orchestrator for the NEAC projects", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every project and link the artifacts
    Build(BuildArgs),
    /// Show build order, include paths and artifact names
    Plan(LayoutArgs),
    /// Diagnose compiler and source layout issues
    Doctor(LayoutArgs),
    /// Generate shell completion scripts
    Completions { shell: Shell },
}

#[derive(Args, Default)]
struct LayoutArgs {
    /// Directory containing the project directories [default: current directory]
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// C compiler used for compiling and linking [default: gcc]
    #[arg(long)]
    compiler: Option<String>,
    /// Artifact naming convention instead of the detected OS
    #[arg(long, value_enum)]
    host: Option<NamingConvention>,
}

#[derive(Args, Default)]
struct BuildArgs {
    #[command(flatten)]
    layout: LayoutArgs,
    /// Optimization flag passed to every compile [default: -O3]
    #[arg(long, allow_hyphen_values = true)]
    optimize: Option<String>,
    /// Worker threads (1 builds strictly sequentially) [default: CPU count]
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Keep building after a step fails
    #[arg(long, conflicts_with = "fail_fast")]
    keep_going: bool,
    /// Stop at the first failed step, even if neacbuild.toml says keep_going
    #[arg(long)]
    fail_fast: bool,
    /// Show what would be executed without running
    #[arg(long)]
    dry_run: bool,
    /// Show detailed build decisions
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_settings(layout: &LayoutArgs, overrides: Overrides) -> Result<BuildSettings> {
    let source_dir = build::resolve_source_dir(layout.source_dir.as_deref())?;
    let config = build::load_config(&source_dir)?;
    Ok(config.resolve(
        source_dir,
        Overrides {
            compiler: layout.compiler.clone(),
            host: layout.host,
            ..overrides
        },
    ))
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        None => run_build(BuildArgs::default()),
        Some(Commands::Build(args)) => run_build(args),
        Some(Commands::Plan(args)) => {
            let settings = resolve_settings(&args, Overrides::default())?;
            commands::plan::show_plan(&settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Doctor(args)) => {
            let settings = resolve_settings(&args, Overrides::default())?;
            commands::doctor::run_doctor(&settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_build(args: BuildArgs) -> Result<ExitCode> {
    let settings = resolve_settings(
        &args.layout,
        Overrides {
            optimize: args.optimize,
            jobs: args.jobs,
            failure_policy: if args.keep_going {
                Some(FailurePolicy::KeepGoing)
            } else if args.fail_fast {
                Some(FailurePolicy::FailFast)
            } else {
                None
            },
            dry_run: args.dry_run,
            verbose: args.verbose,
            ..Default::default()
        },
    )?;

    let summary = commands::build::run_build(&settings)?;
    if summary.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "x".red(), e);
            ExitCode::from(2)
        }
    }
}
