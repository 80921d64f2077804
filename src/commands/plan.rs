//! `neacbuild plan` handler
//!
//! Shows build order, include paths and artifacts without running anything.

use anyhow::Result;
use colored::*;

use crate::build::{ProjectGraph, compile::discover_sources};
use crate::config::BuildSettings;
use crate::layout::PathLayout;
use crate::platform::HostOs;
use crate::ui::Table;

pub fn show_plan(settings: &BuildSettings) -> Result<()> {
    let layout = PathLayout::new(&settings.source_dir, settings.root_levels)?;
    let graph = ProjectGraph::neac(&layout)?;
    let host = settings.host.map(HostOs::from).unwrap_or_else(HostOs::detect);

    println!("{} Build plan", "📋".blue());
    println!("   sources: {}", layout.source_dir().display());
    println!("   objects: {}", layout.object_root().display());
    println!("   binaries: {}", layout.binary_root().display());
    println!();

    let mut table = Table::new(&["Wave", "Project", "Sources", "Includes", "Artifact"]);
    for (i, wave) in graph.waves()?.iter().enumerate() {
        for project in wave {
            let includes = project
                .include_dirs
                .iter()
                .filter_map(|d| d.parent().and_then(|p| p.file_name()))
                .map(|n| n.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(", ");

            let artifact = match &project.artifact {
                Some(a) => match a.output_path(&host) {
                    Ok(path) => path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    Err(e) => format!("{}", e).red().to_string(),
                },
                None => "-".to_string(),
            };

            table.add_row(vec![
                (i + 1).to_string(),
                project.name.clone(),
                discover_sources(&project.source_dir).len().to_string(),
                if includes.is_empty() {
                    "-".to_string()
                } else {
                    includes
                },
                artifact,
            ]);
        }
    }
    table.print();
    Ok(())
}
