use crate::config::{CONFIG_FILE, ConfigFile};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

// --- Helper: Load neacbuild.toml (optional) ---
pub fn load_config(source_dir: &Path) -> Result<ConfigFile> {
    let path = source_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&text).with_context(|| {
        format!(
            "Failed to parse {} - check for typos in key names and quoting",
            path.display()
        )
    })?;
    Ok(config)
}

// --- Helper: Resolve the source directory to an absolute path ---
// The layout counts levels up lexically, so `..` must be gone by now.
pub fn resolve_source_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if dir.is_dir() {
        return fs::canonicalize(&dir)
            .with_context(|| format!("Failed to resolve source directory {}", dir.display()));
    }
    let absolute = std::path::absolute(&dir)
        .with_context(|| format!("Invalid source directory {}", dir.display()))?;
    Ok(normalize_lexically(&absolute))
}

// --- Helper: Drop `.` and fold `..` into its parent without touching the disk ---
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
