//! Per-file compilation.
//!
//! A project is a flat directory of `.c` files. Each one becomes a single
//! `.o` in the project's object directory, always rebuilt.

use super::command::ToolCommand;
use super::core::BuildContext;
use super::graph::Project;
use super::report::CompileEntry;
use crate::layout::ensure_dir;
use crate::toolchain::ToolchainConfig;
use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "c";
pub const OBJECT_EXTENSION: &str = "o";

/// `.c` files directly inside `dir`, sorted by path.
///
/// A missing directory yields nothing.
pub fn discover_sources(dir: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
        .collect();
    sources.sort();
    sources
}

/// `<object_dir>/<stem>.o`
pub fn object_path(source: &Path, object_dir: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(OBJECT_EXTENSION);
    object_dir.join(name)
}

/// `<cc> <opt> -c <source> -o <object> [-I <dir>]...`
pub fn compile_command(
    toolchain: &ToolchainConfig,
    source: &Path,
    object: &Path,
    include_dirs: &[PathBuf],
) -> ToolCommand {
    let mut cmd = ToolCommand::new(&toolchain.compiler);
    if !toolchain.optimize.is_empty() {
        cmd = cmd.arg(&toolchain.optimize);
    }
    cmd = cmd
        .arg("-c")
        .arg(source)
        .arg("-o")
        .arg(object);
    for dir in include_dirs {
        cmd = cmd.arg("-I").arg(dir);
    }
    cmd
}

#[derive(Debug, Default)]
pub struct CompileOutput {
    /// Objects of the sources that compiled
    pub objects: Vec<PathBuf>,
    /// Sources whose compile command failed
    pub failed: Vec<PathBuf>,
    pub entries: Vec<CompileEntry>,
}

impl CompileOutput {
    pub fn total(&self) -> usize {
        self.objects.len() + self.failed.len()
    }
}

/// Compile every source of `project`. Files compile in parallel on the
/// current rayon pool.
///
/// `Err` only when the object directory cannot be created; individual
/// compiler failures land in [`CompileOutput::failed`].
pub fn compile_project(ctx: &BuildContext, project: &Project) -> Result<CompileOutput> {
    if !ctx.dry_run {
        ensure_dir(&project.object_dir)?;
    }

    let sources = discover_sources(&project.source_dir);
    if sources.is_empty() {
        ctx.console.detail(format!(
            "{}: no .{} files in {}",
            project.name,
            SOURCE_EXTENSION,
            project.source_dir.display()
        ));
        return Ok(CompileOutput::default());
    }

    let outcomes: Vec<(PathBuf, PathBuf, ToolCommand, bool)> = sources
        .par_iter()
        .map(|source| {
            let object = object_path(source, &project.object_dir);
            let cmd = compile_command(ctx.toolchain, source, &object, &project.include_dirs);
            let ok = ctx.invoke(&cmd);
            (source.clone(), object, cmd, ok)
        })
        .collect();

    let directory = project.source_dir.to_string_lossy().to_string();
    let mut output = CompileOutput::default();
    for (source, object, cmd, ok) in outcomes {
        output.entries.push(CompileEntry {
            directory: directory.clone(),
            arguments: cmd.argv(),
            file: source.to_string_lossy().to_string(),
            output: object.to_string_lossy().to_string(),
        });
        if ok {
            output.objects.push(object);
        } else {
            output.failed.push(source);
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sources_is_flat_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("b.c"), "").unwrap();
        fs::write(dir.join("a.c"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("a.h"), "").unwrap();
        fs::create_dir_all(dir.join("include")).unwrap();
        fs::write(dir.join("include").join("nested.c"), "").unwrap();

        let found = discover_sources(dir);
        assert_eq!(found, vec![dir.join("a.c"), dir.join("b.c")]);
    }

    #[test]
    fn test_discover_sources_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_sources(&tmp.path().join("absent")).is_empty());
    }

    #[test]
    fn test_object_path_replaces_extension() {
        assert_eq!(
            object_path(Path::new("/src/libneac/lms.c"), Path::new("/obj/libneac")),
            PathBuf::from("/obj/libneac/lms.o")
        );
        assert_eq!(
            object_path(Path::new("/src/x/wave.file.c"), Path::new("/obj/x")),
            PathBuf::from("/obj/x/wave.file.o")
        );
    }

    #[test]
    fn test_compile_command_layout() {
        let tc = ToolchainConfig::new("gcc", "-O3");
        let cmd = compile_command(&tc, Path::new("/s/a.c"), Path::new("/o/a.o"), &[]);
        assert_eq!(cmd.program, "gcc");
        assert_eq!(cmd.args, vec!["-O3", "-c", "/s/a.c", "-o", "/o/a.o"]);
    }

    #[test]
    fn test_compile_command_include_flags_in_order() {
        let tc = ToolchainConfig::default();
        let includes = vec![
            PathBuf::from("/s/libneac/include"),
            PathBuf::from("/s/libwavefile/include"),
        ];
        let cmd = compile_command(&tc, Path::new("/s/neac/neac.c"), Path::new("/o/neac.o"), &includes);

        let flags: Vec<usize> = cmd
            .args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-I")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(flags.len(), 2);
        assert_eq!(cmd.args[flags[0] + 1], "/s/libneac/include");
        assert_eq!(cmd.args[flags[1] + 1], "/s/libwavefile/include");
    }

    #[test]
    fn test_compile_command_without_optimization_flag() {
        let tc = ToolchainConfig::new("clang", "");
        let cmd = compile_command(&tc, Path::new("a.c"), Path::new("a.o"), &[]);
        assert_eq!(cmd.args[0], "-c");
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_command_passes_non_utf8_paths_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9/a.c"));
        let object = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9/obj/a.o"));
        let cmd = compile_command(&ToolchainConfig::default(), source, object, &[]);

        assert_eq!(cmd.args[2].as_bytes(), b"/tmp/caf\xe9/a.c");
        assert_eq!(cmd.value_of("-o").unwrap().as_bytes(), b"/tmp/caf\xe9/obj/a.o");
    }
}
