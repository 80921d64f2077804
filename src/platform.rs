//! Host detection and artifact naming.
//!
//! Only two naming conventions are supported:
//!
//! | Kind           | Linux        | Windows      |
//! |----------------|--------------|--------------|
//! | Executable     | `<name>`     | `<name>.exe` |
//! | Shared library | `<name>.so`  | `<name>.dll` |
//!
//! Any other host is reported as [`NamingError::UnsupportedHost`]. Use
//! `--host` (or `host` in `neacbuild.toml`) to pick a convention explicitly.

use clap::ValueEnum;
use serde::Deserialize;

/// Naming convention selectable from the CLI or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    Linux,
    Windows,
}

/// Operating system the artifacts are named for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    Windows,
    /// Detected, but no naming convention exists for it.
    Unsupported(String),
}

impl HostOs {
    /// Detect the running operating system.
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => HostOs::Linux,
            "windows" => HostOs::Windows,
            other => HostOs::Unsupported(other.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, HostOs::Unsupported(_))
    }
}

impl From<NamingConvention> for HostOs {
    fn from(convention: NamingConvention) -> Self {
        match convention {
            NamingConvention::Linux => HostOs::Linux,
            NamingConvention::Windows => HostOs::Windows,
        }
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostOs::Linux => write!(f, "linux"),
            HostOs::Windows => write!(f, "windows"),
            HostOs::Unsupported(name) => write!(f, "{} (unsupported)", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Executable,
    SharedLibrary,
}

impl ArtifactKind {
    /// Extra flags appended to the link command.
    pub fn link_flags(&self) -> &'static [&'static str] {
        match self {
            ArtifactKind::Executable => &[],
            ArtifactKind::SharedLibrary => &["-shared"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Executable => "executable",
            ArtifactKind::SharedLibrary => "shared library",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// No naming rule for this host
    UnsupportedHost(String),
}

impl std::fmt::Display for NamingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingError::UnsupportedHost(os) => write!(
                f,
                "no artifact naming rule for host '{}' (pass --host linux or --host windows)",
                os
            ),
        }
    }
}

impl std::error::Error for NamingError {}

/// File name of an artifact for the given host.
pub fn artifact_file_name(
    kind: ArtifactKind,
    base_name: &str,
    host: &HostOs,
) -> Result<String, NamingError> {
    let suffix = match (kind, host) {
        (_, HostOs::Unsupported(os)) => return Err(NamingError::UnsupportedHost(os.clone())),
        (ArtifactKind::Executable, HostOs::Linux) => "",
        (ArtifactKind::Executable, HostOs::Windows) => ".exe",
        (ArtifactKind::SharedLibrary, HostOs::Linux) => ".so",
        (ArtifactKind::SharedLibrary, HostOs::Windows) => ".dll",
    };
    Ok(format!("{}{}", base_name, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_names() {
        assert_eq!(
            artifact_file_name(ArtifactKind::Executable, "neac", &HostOs::Linux).unwrap(),
            "neac"
        );
        assert_eq!(
            artifact_file_name(ArtifactKind::Executable, "neac", &HostOs::Windows).unwrap(),
            "neac.exe"
        );
    }

    #[test]
    fn test_shared_library_names() {
        assert_eq!(
            artifact_file_name(ArtifactKind::SharedLibrary, "libneacdll", &HostOs::Linux).unwrap(),
            "libneacdll.so"
        );
        assert_eq!(
            artifact_file_name(ArtifactKind::SharedLibrary, "libneacdll", &HostOs::Windows)
                .unwrap(),
            "libneacdll.dll"
        );
    }

    #[test]
    fn test_unsupported_host_is_an_error() {
        let host = HostOs::from_os_name("macos");
        assert!(!host.is_supported());
        let err = artifact_file_name(ArtifactKind::Executable, "neac", &host).unwrap_err();
        assert_eq!(err, NamingError::UnsupportedHost("macos".to_string()));
        assert!(err.to_string().contains("--host"));
    }

    #[test]
    fn test_convention_overrides_detection() {
        assert_eq!(HostOs::from(NamingConvention::Windows), HostOs::Windows);
        assert_eq!(HostOs::from(NamingConvention::Linux), HostOs::Linux);
    }

    #[test]
    fn test_shared_flag_only_for_libraries() {
        assert!(ArtifactKind::Executable.link_flags().is_empty());
        assert_eq!(ArtifactKind::SharedLibrary.link_flags(), &["-shared"]);
    }
}
