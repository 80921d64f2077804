//! Build configuration.
//!
//! Settings are layered: command-line flags win over `neacbuild.toml` in the
//! source directory, which wins over the built-in defaults (`gcc`, `-O3`,
//! fail-fast, one worker per CPU).

use crate::platform::NamingConvention;
use crate::toolchain::{DEFAULT_COMPILER, DEFAULT_OPTIMIZE, ToolchainConfig};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "neacbuild.toml";

/// Contents of `neacbuild.toml`. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub toolchain: ToolchainSection,
    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSection {
    pub compiler: Option<String>,
    pub optimize: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub jobs: Option<usize>,
    pub keep_going: Option<bool>,
    pub root_levels: Option<usize>,
    pub host: Option<NamingConvention>,
}

/// What happens after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Start no new steps; the rest are reported as skipped.
    #[default]
    FailFast,
    /// Attempt every step anyway. The build still fails overall.
    KeepGoing,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub compiler: Option<String>,
    pub optimize: Option<String>,
    pub jobs: Option<usize>,
    /// `None` defers to the file, then fail-fast
    pub failure_policy: Option<FailurePolicy>,
    pub dry_run: bool,
    pub verbose: bool,
    pub host: Option<NamingConvention>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub toolchain: ToolchainConfig,
    pub source_dir: PathBuf,
    pub root_levels: usize,
    /// Worker threads; 0 picks one per CPU
    pub jobs: usize,
    pub failure_policy: FailurePolicy,
    pub dry_run: bool,
    pub verbose: bool,
    /// Naming convention override; detected from the OS when `None`
    pub host: Option<NamingConvention>,
}

impl BuildSettings {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        ConfigFile::default().resolve(source_dir, Overrides::default())
    }
}

impl ConfigFile {
    pub fn resolve(self, source_dir: impl Into<PathBuf>, overrides: Overrides) -> BuildSettings {
        let compiler = overrides
            .compiler
            .or(self.toolchain.compiler)
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string());
        let optimize = overrides
            .optimize
            .or(self.toolchain.optimize)
            .unwrap_or_else(|| DEFAULT_OPTIMIZE.to_string());

        let file_policy = self.build.keep_going.map(|keep_going| {
            if keep_going {
                FailurePolicy::KeepGoing
            } else {
                FailurePolicy::FailFast
            }
        });

        BuildSettings {
            toolchain: ToolchainConfig::new(compiler, optimize),
            source_dir: source_dir.into(),
            root_levels: self.build.root_levels.unwrap_or(1),
            jobs: overrides.jobs.or(self.build.jobs).unwrap_or(0),
            failure_policy: overrides.failure_policy.or(file_policy).unwrap_or_default(),
            dry_run: overrides.dry_run,
            verbose: overrides.verbose,
            host: overrides.host.or(self.build.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BuildSettings::new("/w/src");
        assert_eq!(settings.toolchain, ToolchainConfig::new("gcc", "-O3"));
        assert_eq!(settings.root_levels, 1);
        assert_eq!(settings.jobs, 0);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert_eq!(settings.host, None);
    }

    #[test]
    fn test_parse_full_file() {
        let text = r#"
[toolchain]
compiler = "clang"
optimize = "-O2"

[build]
jobs = 4
keep_going = true
root_levels = 2
host = "windows"
"#;
        let file: ConfigFile = toml::from_str(text).unwrap();
        let settings = file.resolve("/w/src", Overrides::default());
        assert_eq!(settings.toolchain, ToolchainConfig::new("clang", "-O2"));
        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.root_levels, 2);
        assert_eq!(settings.failure_policy, FailurePolicy::KeepGoing);
        assert_eq!(settings.host, Some(NamingConvention::Windows));
    }

    #[test]
    fn test_cli_beats_file() {
        let file: ConfigFile = toml::from_str("[toolchain]\ncompiler = \"clang\"\n[build]\njobs = 4\n").unwrap();
        let settings = file.resolve(
            "/w/src",
            Overrides {
                compiler: Some("tcc".into()),
                jobs: Some(1),
                host: Some(NamingConvention::Linux),
                ..Default::default()
            },
        );
        assert_eq!(settings.toolchain.compiler, "tcc");
        assert_eq!(settings.toolchain.optimize, "-O3");
        assert_eq!(settings.jobs, 1);
        assert_eq!(settings.host, Some(NamingConvention::Linux));
    }

    #[test]
    fn test_keep_going_flag_enables_policy() {
        let settings = ConfigFile::default().resolve(
            "/w/src",
            Overrides {
                failure_policy: Some(FailurePolicy::KeepGoing),
                ..Default::default()
            },
        );
        assert_eq!(settings.failure_policy, FailurePolicy::KeepGoing);
    }

    #[test]
    fn test_fail_fast_flag_beats_file_keep_going() {
        let file: ConfigFile = toml::from_str("[build]
keep_going = true
").unwrap();
        let settings = file.resolve(
            "/w/src",
            Overrides {
                failure_policy: Some(FailurePolicy::FailFast),
                ..Default::default()
            },
        );
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<ConfigFile>("[toolchain]\ncc = \"gcc\"\n").is_err());
        assert!(toml::from_str::<ConfigFile>("[extras]\n").is_err());
    }

    #[test]
    fn test_bad_host_rejected() {
        assert!(toml::from_str::<ConfigFile>("[build]\nhost = \"macos\"\n").is_err());
    }
}
