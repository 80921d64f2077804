use std::fmt;

pub const DEFAULT_COMPILER: &str = "gcc";
pub const DEFAULT_OPTIMIZE: &str = "-O3";

/// Compiler selection for one build run.
///
/// The compiler doubles as the link driver, so the same binary is used for
/// both compile and link commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Compiler name resolvable on PATH, or a path to it
    pub compiler: String,

    /// Optimization flag passed verbatim to every compile command
    pub optimize: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: DEFAULT_COMPILER.to_string(),
            optimize: DEFAULT_OPTIMIZE.to_string(),
        }
    }
}

impl ToolchainConfig {
    pub fn new(compiler: impl Into<String>, optimize: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            optimize: optimize.into(),
        }
    }
}

/// Result of probing a compiler with `--version`
#[derive(Debug, Clone)]
pub struct ToolchainInfo {
    pub compiler: String,
    pub version: String,
}

/// Error type for toolchain operations
#[derive(Debug)]
pub enum ToolchainError {
    /// Compiler could not be started
    NotFound(String),
    /// Compiler started but `--version` failed
    ProbeFailed(String),
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainError::NotFound(msg) => write!(f, "Compiler not found: {}", msg),
            ToolchainError::ProbeFailed(msg) => write!(f, "Compiler probe failed: {}", msg),
        }
    }
}

impl std::error::Error for ToolchainError {}
