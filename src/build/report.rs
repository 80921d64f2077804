//! Per-step build results.
//!
//! Every compile and link step records exactly one [`StepReport`]. The
//! overall build succeeds only when every recorded step succeeded.

use crate::ui::Table;
use colored::*;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Compile,
    Link,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Compile => write!(f, "compile"),
            StepKind::Link => write!(f, "link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed(String),
    /// Not attempted because an earlier step failed
    Skipped,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub project: String,
    pub kind: StepKind,
    pub status: StepStatus,
    /// Number of tool invocations the step issued
    pub commands: usize,
    pub duration: Duration,
}

/// One entry of `compile_commands.json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompileEntry {
    pub directory: String,
    pub arguments: Vec<String>,
    pub file: String,
    pub output: String,
}

/// Thread-safe collector shared by the worker pool.
#[derive(Debug, Default)]
pub struct BuildReport {
    steps: Mutex<Vec<StepReport>>,
    entries: Mutex<Vec<CompileEntry>>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoned locks are recovered so no step goes missing.
    pub fn record(&self, step: StepReport) {
        self.steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(step);
    }

    pub fn add_entries(&self, new_entries: Vec<CompileEntry>) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(new_entries);
    }

    pub fn finish(self) -> BuildSummary {
        let steps = self.steps.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.entries.into_inner().unwrap_or_else(|e| e.into_inner());
        entries.sort_by(|a, b| a.file.cmp(&b.file));
        BuildSummary { steps, entries }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// In completion order
    pub steps: Vec<StepReport>,
    /// Sorted by source file
    pub entries: Vec<CompileEntry>,
}

impl BuildSummary {
    pub fn success(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed(_)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Skipped))
    }

    pub fn step(&self, project: &str, kind: StepKind) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| s.project == project && s.kind == kind)
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new(&["Project", "Step", "Status", "Commands", "Time"]);
        for step in &self.steps {
            let status = match &step.status {
                StepStatus::Succeeded => "ok".green().to_string(),
                StepStatus::Failed(reason) => format!("{} {}", "failed:".red(), reason),
                StepStatus::Skipped => "skipped".yellow().to_string(),
            };
            table.add_row(vec![
                step.project.clone(),
                step.kind.to_string(),
                status,
                step.commands.to_string(),
                format!("{:.2?}", step.duration),
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(project: &str, kind: StepKind, status: StepStatus) -> StepReport {
        StepReport {
            project: project.to_string(),
            kind,
            status,
            commands: 1,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_summary_success() {
        let report = BuildReport::new();
        report.record(step("libneac", StepKind::Compile, StepStatus::Succeeded));
        report.record(step("neac", StepKind::Link, StepStatus::Succeeded));
        let summary = report.finish();
        assert!(summary.success());
        assert_eq!(summary.failed().count(), 0);
    }

    #[test]
    fn test_summary_failure_and_skip() {
        let report = BuildReport::new();
        report.record(step(
            "libneac",
            StepKind::Compile,
            StepStatus::Failed("1 of 2 files failed".into()),
        ));
        report.record(step("neac", StepKind::Link, StepStatus::Skipped));
        let summary = report.finish();
        assert!(!summary.success());
        assert_eq!(summary.failed().count(), 1);
        assert_eq!(summary.skipped().count(), 1);
        assert!(summary.step("neac", StepKind::Link).is_some());
        assert!(summary.step("neac", StepKind::Compile).is_none());
    }

    #[test]
    fn test_skipped_alone_is_not_success() {
        let report = BuildReport::new();
        report.record(step("neac", StepKind::Compile, StepStatus::Skipped));
        assert!(!report.finish().success());
    }

    #[test]
    fn test_poisoned_report_keeps_failures() {
        let report = BuildReport::new();
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = report.steps.lock().unwrap();
            panic!("worker panicked");
        }));
        assert!(poisoned.is_err());
        assert!(report.steps.is_poisoned());

        report.record(step(
            "libneac",
            StepKind::Compile,
            StepStatus::Failed("1 of 1 files failed".into()),
        ));
        let summary = report.finish();
        assert_eq!(summary.steps.len(), 1);
        assert!(!summary.success());
    }

    #[test]
    fn test_entries_sorted_by_file() {
        let report = BuildReport::new();
        let entry = |file: &str| CompileEntry {
            directory: "/w".into(),
            arguments: vec!["gcc".into()],
            file: file.into(),
            output: "x.o".into(),
        };
        report.add_entries(vec![entry("b.c"), entry("a.c")]);
        let summary = report.finish();
        assert_eq!(summary.entries[0].file, "a.c");
    }

    #[test]
    fn test_table_has_row_per_step() {
        colored::control::set_override(false);
        let report = BuildReport::new();
        report.record(step("libneac", StepKind::Compile, StepStatus::Succeeded));
        report.record(step("neac", StepKind::Link, StepStatus::Skipped));
        let out = report.finish().table().render(120);
        assert!(out.contains("libneac"));
        assert!(out.contains("skipped"));
    }
}
