//! Subprocess execution

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Result of a subprocess execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }

    /// Short description of a failed run for error messages
    pub fn failure_summary(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", self.exit_code)
        } else {
            format!("exit code {}: {}", self.exit_code, stderr)
        }
    }
}

/// Something that can run an external program inside a directory
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandResult>;
}

/// Runs commands for real, letting their output reach the terminal
#[derive(Debug, Default)]
pub struct SystemRunner {
    pub verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandResult> {
        if self.verbose {
            eprintln!("Executing: {} {}", program, args.join(" "));
        }
        let result = run_command(program, args, cwd, true)?;
        if self.verbose {
            eprintln!("Finished {} in {:.2}s", program, result.duration.as_secs_f64());
        }
        Ok(result)
    }
}

/// Run a command in `cwd`
pub fn run_command(program: &str, args: &[String], cwd: &Path, inherit_io: bool) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd);

    if inherit_io {
        // Inherit stdin/stdout/stderr so generator and pip output is visible
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", program))?;

        let duration = start.elapsed();
        Ok(CommandResult::from_status(
            status,
            String::new(),
            String::new(),
            duration,
        ))
    } else {
        // Capture output
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(CommandResult::from_status(
            output.status,
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary_includes_stderr() {
        let result = CommandResult {
            success: false,
            exit_code: 2,
            stdout: String::new(),
            stderr: "CommandError: 'blog' conflicts\n".to_string(),
            duration: Duration::ZERO,
        };
        assert_eq!(result.failure_summary(), "exit code 2: CommandError: 'blog' conflicts");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let cwd = std::env::temp_dir();
        let result = run_command("porosdjango-no-such-program", &[], &cwd, false);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to execute porosdjango-no-such-program"));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_in_cwd() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = run_command("pwd", &[], temp_dir.path(), false).unwrap();
        assert!(result.success);
        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
    }
}
