//! Toolchain selection and probing.
//!
//! The build never searches for a compiler on its own: whatever
//! [`ToolchainConfig::compiler`] names is what runs. Probing only exists to
//! print a useful banner and to power `neacbuild doctor`.

pub mod types;

pub use types::{DEFAULT_COMPILER, DEFAULT_OPTIMIZE, ToolchainConfig, ToolchainError, ToolchainInfo};

use std::process::Command;

/// Run `<compiler> --version` and keep the first line.
pub fn probe(compiler: &str) -> Result<ToolchainInfo, ToolchainError> {
    let output = Command::new(compiler)
        .arg("--version")
        .output()
        .map_err(|e| ToolchainError::NotFound(format!("{}: {}", compiler, e)))?;

    if !output.status.success() {
        return Err(ToolchainError::ProbeFailed(format!(
            "{} --version exited with {}",
            compiler, output.status
        )));
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(ToolchainInfo {
        compiler: compiler.to_string(),
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolchain() {
        let tc = ToolchainConfig::default();
        assert_eq!(tc.compiler, "gcc");
        assert_eq!(tc.optimize, "-O3");
    }

    #[test]
    fn test_probe_missing_compiler() {
        let err = probe("neacbuild-no-such-compiler").unwrap_err();
        assert!(matches!(err, ToolchainError::NotFound(_)));
        assert!(err.to_string().contains("neacbuild-no-such-compiler"));
    }
}
