//! `neacbuild build` handler.

use anyhow::Result;
use colored::*;

use crate::build::{self, BuildSummary};
use crate::config::{BuildSettings, FailurePolicy};
use crate::toolchain;

/// Print the banner, run the build and report. Returns the summary so the
/// caller can pick an exit status.
pub fn run_build(settings: &BuildSettings) -> Result<BuildSummary> {
    println!(
        "{} Building NEAC with {} ({})",
        "🚀".blue(),
        settings.toolchain.compiler.bold(),
        settings.toolchain.optimize
    );

    if !settings.dry_run {
        match toolchain::probe(&settings.toolchain.compiler) {
            Ok(info) => println!("   {} {}: {}", "🔧".cyan(), info.compiler, info.version.dimmed()),
            Err(e) => println!("   {} {}", "⚠".yellow(), e),
        }
    }

    if settings.failure_policy == FailurePolicy::KeepGoing {
        println!("   {} Continuing past failed steps", "→".dimmed());
    }

    build::build_all(settings)
}
