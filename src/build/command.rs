//! External tool invocation.
//!
//! Commands are argument vectors handed straight to the OS; there is no
//! shell in between, so paths with spaces or quotes need no escaping. The
//! quoting in [`ToolCommand::display_line`] is for the echoed log line only.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    /// Handed to the OS as-is; may hold non-UTF-8 paths
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, e.g. the output path after `-o`.
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    /// Program and arguments as text, e.g. for a compilation database
    /// entry. Non-UTF-8 bytes are replaced.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect()
    }

    /// Human-readable command line. Arguments with whitespace are quoted.
    pub fn display_line(&self) -> String {
        self.argv()
            .iter()
            .map(|part| quote(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.chars().any(char::is_whitespace) {
        format!("\"{}\"", part)
    } else {
        part.to_string()
    }
}

/// Captured result of one finished process.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// stdout and stderr combined, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Seam between the build and the OS.
///
/// Implementations are shared across worker threads.
pub trait CommandRunner: Send + Sync {
    /// Run to completion. `Err` means the process could not be started.
    fn run(&self, cmd: &ToolCommand) -> io::Result<RunOutput>;
}

/// Runs commands as real child processes, blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cmd: &ToolCommand) -> io::Result<RunOutput> {
        let output = Command::new(&cmd.program).args(&cmd.args).output()?;
        Ok(RunOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_paths_with_spaces() {
        let cmd = ToolCommand::new("gcc")
            .arg("-c")
            .arg("/my projects/a.c")
            .arg("-o")
            .arg("/obj/a.o");
        assert_eq!(
            cmd.display_line(),
            "gcc -c \"/my projects/a.c\" -o /obj/a.o"
        );
    }

    #[test]
    fn test_arguments_are_not_escaped() {
        // A quote in a path stays a single argument.
        let cmd = ToolCommand::new("gcc").arg("/tmp/we\"ird/a.c");
        assert_eq!(cmd.args, vec!["/tmp/we\"ird/a.c"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_argument_kept_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let path = OsStr::from_bytes(b"/tmp/caf\xe9/a.c");
        let cmd = ToolCommand::new("gcc").arg("-o").arg(path);
        assert_eq!(cmd.value_of("-o").unwrap().as_bytes(), b"/tmp/caf\xe9/a.c");
        assert!(cmd.display_line().contains('\u{FFFD}'));
    }

    #[test]
    fn test_value_of() {
        let cmd = ToolCommand::new("gcc").args(["a.o", "-o", "bin/neac"]);
        assert_eq!(cmd.value_of("-o"), Some(OsStr::new("bin/neac")));
        assert_eq!(cmd.value_of("-I"), None);
    }

    #[test]
    fn test_argv_starts_with_program() {
        let cmd = ToolCommand::new("clang").arg("-c");
        assert_eq!(cmd.argv(), vec!["clang".to_string(), "-c".to_string()]);
    }

    #[test]
    fn test_combined_output() {
        let out = RunOutput {
            stderr: "error: boom".into(),
            ..Default::default()
        };
        assert_eq!(out.combined(), "error: boom");
    }

    #[test]
    fn test_process_runner_reports_spawn_failure() {
        let cmd = ToolCommand::new("neacbuild-no-such-compiler").arg("--version");
        assert!(ProcessRunner.run(&cmd).is_err());
    }
}
