//! Doctor command handler
//!
//! Handles `neacbuild doctor`.

use anyhow::Result;
use colored::*;

use crate::build::{ProjectGraph, compile::discover_sources};
use crate::config::BuildSettings;
use crate::layout::PathLayout;
use crate::platform::HostOs;
use crate::toolchain;

/// Run the `neacbuild doctor` command to diagnose setup issues
pub fn run_doctor(settings: &BuildSettings) -> Result<()> {
    println!("{} Running Build Doctor...", "🚑".red());
    println!("-------------------------------");

    print!("Checking OS... ");
    println!(
        "{} ({})",
        std::env::consts::OS.green(),
        std::env::consts::ARCH.cyan()
    );

    print!("Checking artifact naming... ");
    let host = settings.host.map(HostOs::from).unwrap_or_else(HostOs::detect);
    if host.is_supported() {
        println!("{}", host.to_string().green());
    } else {
        println!(
            "{}",
            format!("{} - pass --host linux or --host windows", host).red()
        );
    }

    print!("Checking {}... ", settings.toolchain.compiler);
    match toolchain::probe(&settings.toolchain.compiler) {
        Ok(info) => println!("{} {} ({})", "Found".green(), info.compiler, info.version),
        Err(e) => println!("{}", format!("Not Found ({})", e).red()),
    }

    println!();
    let layout = PathLayout::new(&settings.source_dir, settings.root_levels)?;
    println!("Project root: {}", layout.project_root().display());
    let graph = ProjectGraph::neac(&layout)?;
    for project in graph.projects() {
        print!("Checking {}... ", project.name);
        if !project.source_dir.is_dir() {
            println!("{}", "Missing (will compile nothing)".yellow());
            continue;
        }
        let count = discover_sources(&project.source_dir).len();
        if count == 0 {
            println!("{}", "No .c files".yellow());
        } else {
            println!("{} ({} files)", "Found".green(), count);
        }
        for include in &project.include_dirs {
            if !include.is_dir() {
                println!("  {} missing include dir {}", "!".yellow(), include.display());
            }
        }
    }

    Ok(())
}
