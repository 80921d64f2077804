pub mod command;
pub mod compile;
mod core;
pub mod feedback;
pub mod graph;
pub mod link;
pub mod report;
mod utils;

pub use command::{CommandRunner, ProcessRunner, RunOutput, ToolCommand};
pub use core::{BuildContext, COMPILE_COMMANDS, build_all, build_with_runner, planned_objects};
pub use graph::{NEAC_PROJECTS, Project, ProjectGraph, ProjectSpec};
pub use link::Artifact;
pub use report::{BuildSummary, StepKind, StepStatus};
pub use utils::{load_config, resolve_source_dir};
