//! Artifact linking.
//!
//! Objects are gathered by scanning directories at link time, never from a
//! remembered list, so whatever sits in an object directory gets linked.

use super::command::ToolCommand;
use super::compile::OBJECT_EXTENSION;
use super::core::BuildContext;
use crate::layout::ensure_dir;
use crate::platform::{ArtifactKind, HostOs, NamingError, artifact_file_name};
use crate::toolchain::ToolchainConfig;
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub base_name: String,
    pub output_dir: PathBuf,
    /// Link order is exactly this order
    pub object_dirs: Vec<PathBuf>,
}

impl Artifact {
    pub fn output_path(&self, host: &HostOs) -> Result<PathBuf, NamingError> {
        let name = artifact_file_name(self.kind, &self.base_name, host)?;
        Ok(self.output_dir.join(name))
    }
}

/// `.o` files directly inside each directory. Sorted within a directory,
/// concatenated across directories in the given order.
pub fn collect_objects(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut objects = Vec::new();
    for dir in dirs {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == OBJECT_EXTENSION))
            .collect();
        found.sort();
        objects.extend(found);
    }
    objects
}

/// `<cc> <objects>... -o <output> <extra>...`
pub fn link_command(
    toolchain: &ToolchainConfig,
    objects: &[PathBuf],
    output: &Path,
    extra_flags: &[&str],
) -> ToolCommand {
    ToolCommand::new(&toolchain.compiler)
        .args(objects)
        .arg("-o")
        .arg(output)
        .args(extra_flags.iter().copied())
}

/// Link `artifact` from `objects`, returning the written path.
pub fn link_artifact(
    ctx: &BuildContext,
    artifact: &Artifact,
    objects: &[PathBuf],
    host: &HostOs,
) -> Result<PathBuf> {
    let output = artifact.output_path(host)?;
    if !ctx.dry_run {
        ensure_dir(&artifact.output_dir)?;
    }

    let cmd = link_command(ctx.toolchain, objects, &output, artifact.kind.link_flags());
    if !ctx.invoke(&cmd) {
        bail!("{} exited with failure", ctx.toolchain.compiler);
    }
    Ok(output)
}
