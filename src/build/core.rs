use super::command::{CommandRunner, ProcessRunner, ToolCommand};
use super::compile::{compile_project, discover_sources, object_path};
use super::feedback::FeedbackAnalyzer;
use super::graph::{Project, ProjectGraph};
use super::link::{Artifact, collect_objects, link_artifact};
use super::report::{BuildReport, BuildSummary, CompileEntry, StepKind, StepReport, StepStatus};
use crate::config::{BuildSettings, FailurePolicy};
use crate::layout::PathLayout;
use crate::platform::{HostOs, NamingError};
use crate::toolchain::ToolchainConfig;
use crate::ui::Console;
use anyhow::{Context, Result};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub const COMPILE_COMMANDS: &str = "compile_commands.json";

/// Everything a compile or link step needs to issue commands.
pub struct BuildContext<'a> {
    pub toolchain: &'a ToolchainConfig,
    pub runner: &'a dyn CommandRunner,
    pub console: &'a Console,
    /// Echo commands without running them
    pub dry_run: bool,
}

impl BuildContext<'_> {
    /// Echo and run one command. `true` when it exited successfully.
    pub fn invoke(&self, cmd: &ToolCommand) -> bool {
        self.console.echo(&cmd.display_line());
        if self.dry_run {
            return true;
        }

        match self.runner.run(cmd) {
            Ok(output) if output.success => {
                // Warnings
                let diagnostics = output.combined();
                if !diagnostics.trim().is_empty() {
                    self.console.println(diagnostics.trim_end());
                }
                true
            }
            Ok(output) => {
                let diagnostics = output.combined();
                let code = output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                self.console.println(format!(
                    "{} {} exited with {}:\n{}",
                    "x".red(),
                    cmd.program,
                    code,
                    diagnostics.trim_end()
                ));
                if let Some(hint) = FeedbackAnalyzer::analyze(&diagnostics) {
                    self.console.println(format!("{} {}", "💡".yellow(), hint));
                }
                false
            }
            Err(e) => {
                self.console
                    .println(format!("{} Failed to execute {}: {}", "x".red(), cmd.program, e));
                self.console.println(format!(
                    "{} {}",
                    "💡".yellow(),
                    FeedbackAnalyzer::spawn_failure(&cmd.program)
                ));
                false
            }
        }
    }
}

// --- CORE: Build every project ---
pub fn build_all(settings: &BuildSettings) -> Result<BuildSummary> {
    build_with_runner(settings, &ProcessRunner)
}

pub fn build_with_runner(
    settings: &BuildSettings,
    runner: &dyn CommandRunner,
) -> Result<BuildSummary> {
    let start_time = Instant::now();

    // 1. Layout. Output directories are created by the steps that write
    // into them, so a failure there is reported as that step's failure.
    let layout = PathLayout::new(&settings.source_dir, settings.root_levels)?;

    // 2. Graph
    let graph = ProjectGraph::neac(&layout)?;
    let waves = graph.waves()?;
    let host = settings.host.map(HostOs::from).unwrap_or_else(HostOs::detect);

    let console = if settings.dry_run {
        Console::hidden(settings.verbose)
    } else {
        Console::new(graph.step_count() as u64, settings.verbose)
    };
    console.detail(format!("project root: {}", layout.project_root().display()));
    console.detail(format!("artifact naming: {}", host));

    let ctx = BuildContext {
        toolchain: &settings.toolchain,
        runner,
        console: &console,
        dry_run: settings.dry_run,
    };

    // 3. Waves on a bounded pool
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.jobs)
        .build()
        .context("Failed to start build worker pool")?;

    let report = BuildReport::new();
    let halted = AtomicBool::new(false);
    let run = ProjectRun {
        ctx: &ctx,
        graph: &graph,
        host: &host,
        policy: settings.failure_policy,
        halted: &halted,
        report: &report,
    };

    for (i, wave) in waves.iter().enumerate() {
        console.detail(format!(
            "wave {}: {}",
            i + 1,
            wave.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
        ));
        pool.install(|| wave.par_iter().for_each(|project| run.project(project)));
    }
    console.finish();

    let summary = report.finish();

    // 4. compile_commands.json
    if !settings.dry_run
        && let Err(e) = write_compile_commands(&layout.object_root(), &summary.entries)
    {
        println!("{} {:#}", "!".yellow(), e);
    }

    // 5. Summary
    let table = summary.table();
    if !table.is_empty() {
        table.print();
    }
    if settings.dry_run {
        println!("{} Dry run, nothing was executed", "→".dimmed());
    } else if summary.success() {
        println!(
            "{} Build finished in {:.2?}",
            "✓".green(),
            start_time.elapsed()
        );
    } else {
        println!(
            "{} Build failed in {:.2?} ({} failed, {} skipped)",
            "x".red(),
            start_time.elapsed(),
            summary.failed().count(),
            summary.skipped().count()
        );
    }

    Ok(summary)
}

struct ProjectRun<'a> {
    ctx: &'a BuildContext<'a>,
    graph: &'a ProjectGraph,
    host: &'a HostOs,
    policy: FailurePolicy,
    halted: &'a AtomicBool,
    report: &'a BuildReport,
}

impl ProjectRun<'_> {
    fn should_skip(&self) -> bool {
        self.policy == FailurePolicy::FailFast && self.halted.load(Ordering::SeqCst)
    }

    fn skip(&self, project: &Project, kind: StepKind) {
        self.ctx
            .console
            .detail(format!("{} {}: skipped", kind, project.name));
        self.finish_step(project, kind, StepStatus::Skipped, 0, Instant::now());
    }

    fn finish_step(
        &self,
        project: &Project,
        kind: StepKind,
        status: StepStatus,
        commands: usize,
        started: Instant,
    ) {
        if let StepStatus::Failed(reason) = &status {
            self.halted.store(true, Ordering::SeqCst);
            self.ctx
                .console
                .println(format!("{} {} {}: {}", "x".red(), kind, project.name.bold(), reason));
        }
        self.ctx.console.step_done();
        self.report.record(StepReport {
            project: project.name.clone(),
            kind,
            status,
            commands,
            duration: started.elapsed(),
        });
    }

    /// Compile, then link when the project has an artifact.
    fn project(&self, project: &Project) {
        if self.should_skip() {
            self.skip(project, StepKind::Compile);
            if project.artifact.is_some() {
                self.skip(project, StepKind::Link);
            }
            return;
        }

        let compiled = self.compile(project);

        let Some(artifact) = &project.artifact else {
            return;
        };
        if self.should_skip() {
            self.skip(project, StepKind::Link);
            return;
        }
        if !compiled {
            self.ctx.console.detail(format!(
                "linking {} despite compile failures (keep-going)",
                project.name
            ));
        }
        self.link(project, artifact);
    }

    fn compile(&self, project: &Project) -> bool {
        let started = Instant::now();
        self.ctx
            .console
            .set_message(format!("Compiling {}", project.name));

        let (status, commands) = match compile_project(self.ctx, project) {
            Ok(output) => {
                let total = output.total();
                let failed = output.failed.len();
                self.report.add_entries(output.entries);
                if failed == 0 {
                    self.ctx.console.detail(format!(
                        "{} compiled {} ({} files)",
                        "✓".green(),
                        project.name,
                        total
                    ));
                    (StepStatus::Succeeded, total)
                } else {
                    (
                        StepStatus::Failed(format!("{} of {} files failed", failed, total)),
                        total,
                    )
                }
            }
            Err(e) => (StepStatus::Failed(format!("{:#}", e)), 0),
        };

        let ok = status.is_success();
        self.finish_step(project, StepKind::Compile, status, commands, started);
        ok
    }

    fn link(&self, project: &Project, artifact: &Artifact) {
        let started = Instant::now();
        self.ctx
            .console
            .set_message(format!("Linking {}", artifact.base_name));

        let objects = if self.ctx.dry_run {
            planned_objects(self.graph, artifact)
        } else {
            collect_objects(&artifact.object_dirs)
        };

        let (status, commands) = match link_artifact(self.ctx, artifact, &objects, self.host) {
            Ok(path) => {
                self.ctx.console.detail(format!(
                    "{} linked {} {}",
                    "✓".green(),
                    artifact.kind.label(),
                    path.display()
                ));
                (StepStatus::Succeeded, 1)
            }
            // Naming errors never reach the toolchain
            Err(e) if e.is::<NamingError>() => {
                (StepStatus::Failed(e.to_string()), 0)
            }
            Err(e) => (StepStatus::Failed(format!("{:#}", e)), 1),
        };

        self.finish_step(project, StepKind::Link, status, commands, started);
    }
}

/// Objects a link would see once every contributing project has compiled.
/// Used by dry runs, where nothing is on disk yet.
pub fn planned_objects(graph: &ProjectGraph, artifact: &Artifact) -> Vec<PathBuf> {
    let mut objects = Vec::new();
    for dir in &artifact.object_dirs {
        match graph.projects().iter().find(|p| &p.object_dir == dir) {
            Some(project) => objects.extend(
                discover_sources(&project.source_dir)
                    .iter()
                    .map(|src| object_path(src, dir)),
            ),
            None => objects.extend(collect_objects(std::slice::from_ref(dir))),
        }
    }
    objects
}

fn write_compile_commands(object_root: &Path, entries: &[CompileEntry]) -> Result<()> {
    let path = object_root.join(COMPILE_COMMANDS);
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}
