//! Directory layout of a build.
//!
//! ```text
//! <root>/                 root_levels above the source directory
//! ├── <source>/           the directory holding the projects
//! │   ├── libneac/        sources + include/
//! │   └── ...
//! ├── obj/<project>/      one object directory per project
//! └── bin/                final artifacts
//! ```
//!
//! All derivations are path joins; nothing here touches the filesystem
//! except [`ensure_dir`].

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub const OBJECT_ROOT: &str = "obj";
pub const BINARY_ROOT: &str = "bin";
pub const INCLUDE_DIR: &str = "include";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    source_dir: PathBuf,
    project_root: PathBuf,
}

impl PathLayout {
    /// `root_levels` is how many directories above `source_dir` the
    /// project root sits. The original layout uses one.
    pub fn new(source_dir: &Path, root_levels: usize) -> Result<Self> {
        let project_root = match source_dir.ancestors().nth(root_levels) {
            Some(root) if !root.as_os_str().is_empty() => root.to_path_buf(),
            _ => bail!(
                "cannot go {} level(s) above '{}'",
                root_levels,
                source_dir.display()
            ),
        };

        Ok(Self {
            source_dir: source_dir.to_path_buf(),
            project_root,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn object_root(&self) -> PathBuf {
        self.project_root.join(OBJECT_ROOT)
    }

    pub fn binary_root(&self) -> PathBuf {
        self.project_root.join(BINARY_ROOT)
    }

    pub fn project_source_dir(&self, project: &str) -> PathBuf {
        self.source_dir.join(project)
    }

    pub fn project_object_dir(&self, project: &str) -> PathBuf {
        self.object_root().join(project)
    }

    /// Include directory a project advertises to its dependents.
    pub fn include_dir(&self, project: &str) -> PathBuf {
        self.project_source_dir(project).join(INCLUDE_DIR)
    }
}

/// Create `dir` and any missing parents. Existing directories are left alone.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_one_level_up() {
        let layout = PathLayout::new(Path::new("/work/neac/src"), 1).unwrap();
        assert_eq!(layout.project_root(), Path::new("/work/neac"));
        assert_eq!(layout.object_root(), PathBuf::from("/work/neac/obj"));
        assert_eq!(layout.binary_root(), PathBuf::from("/work/neac/bin"));
        assert_eq!(
            layout.project_object_dir("libneac"),
            PathBuf::from("/work/neac/obj/libneac")
        );
        assert_eq!(
            layout.project_source_dir("neac"),
            PathBuf::from("/work/neac/src/neac")
        );
        assert_eq!(
            layout.include_dir("libneac"),
            PathBuf::from("/work/neac/src/libneac/include")
        );
    }

    #[test]
    fn test_layout_zero_levels_keeps_source_dir_as_root() {
        let layout = PathLayout::new(Path::new("/work/src"), 0).unwrap();
        assert_eq!(layout.project_root(), Path::new("/work/src"));
    }

    #[test]
    fn test_layout_too_many_levels() {
        assert!(PathLayout::new(Path::new("src"), 1).is_err());
        assert!(PathLayout::new(Path::new("/a"), 5).is_err());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("obj").join("libneac");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
