use colored::*;

/// Turns raw compiler/linker output into a short hint for the user.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // Shared library linked from non-PIC objects
        if output.contains("recompile with -fPIC") {
            return Some(format!(
                "The shared library was linked from position-dependent objects.\nUse a toolchain that emits position independent code by default, or one configured for {}.",
                "-fPIC".bold().green()
            ));
        }

        if output.contains("undefined reference to `main'")
            || output.contains("entry point must be defined")
        {
            return Some(format!(
                "The executable has no {} function.\nCheck that the project's entry point source file is in its directory.",
                "main()".bold().yellow()
            ));
        }

        if output.contains("LNK2019") || output.contains("undefined reference to") {
            return Some(format!(
                "It looks like a {} error.\nA library project probably failed to compile, so its objects are missing from the link.\nScroll up for the first failing {} step.",
                "Linker".bold().red(),
                "compile".bold().yellow()
            ));
        }

        if (output.contains("fatal error: ") && output.contains("No such file or directory"))
            || output.contains("cannot open include file")
        {
            return Some(format!(
                "It looks like a {} error.\nHeaders shared between projects must live in the library's {} directory.",
                "Missing Header".bold().red(),
                "include/".bold().yellow()
            ));
        }

        None
    }

    /// Hint for a compiler that could not be started at all.
    pub fn spawn_failure(compiler: &str) -> String {
        format!(
            "Could not start {}.\nInstall it, put it on PATH, or pick another with {} or {} in {}.",
            compiler.bold().red(),
            "--compiler".bold().green(),
            "compiler".bold().yellow(),
            "neacbuild.toml".bold().yellow()
        )
    }
}
