use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Runs child processes with inherited stdio and consistent error handling
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    current_dir: Option<PathBuf>,
}

impl CommandExecutor {
    /// Create a new CommandExecutor that runs in the caller's directory
    pub fn new() -> Self {
        Self { current_dir: None }
    }

    /// Run every command with `dir` as its working directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            current_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    /// Execute a command and fail on a non-zero exit
    pub fn run(&self, args: &[&str]) -> Result<CommandStatus> {
        self.run_with_check(args, true)
    }

    /// Execute a command with optional exit code checking
    pub fn run_with_check(&self, args: &[&str], check: bool) -> Result<CommandStatus> {
        if args.is_empty() {
            anyhow::bail!("No command provided");
        }

        match &self.current_dir {
            Some(dir) => debug!("Executing in {}: {}", dir.display(), args.join(" ")),
            None => debug!("Executing: {}", args.join(" ")),
        }

        let mut command = Command::new(args[0]);
        command
            .args(&args[1..])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to execute command: {}", args.join(" ")))?;
        let result = CommandStatus::from(status);

        if check && !result.success() {
            debug!("Command failed with exit code {}: {}", result.exit_code, args.join(" "));
            anyhow::bail!(
                "Command failed with exit code {}: {}",
                result.exit_code,
                args.join(" ")
            );
        }

        Ok(result)
    }

    /// Execute a command without checking the exit code
    pub fn run_unchecked(&self, args: &[&str]) -> Result<CommandStatus> {
        self.run_with_check(args, false)
    }
}

/// Result of command execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// -1 when the child was killed by a signal
    pub exit_code: i32,
}

impl CommandStatus {
    /// Check if the command was successful
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            exit_code: status.code().unwrap_or(-1),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandExecutor::new().run(&[]).is_err());
    }

    #[test]
    fn checked_run_fails_on_non_zero_exit() {
        let executor = CommandExecutor::new();
        assert!(executor.run(&["false"]).is_err());
        let status = executor.run_unchecked(&["false"]).unwrap();
        assert_eq!(status.exit_code, 1);
        assert!(!status.success());
    }

    #[test]
    fn missing_program_is_an_error() {
        let err = CommandExecutor::new()
            .run_unchecked(&["sb-definitely-not-a-real-program"])
            .unwrap_err();
        assert!(err.to_string().contains("sb-definitely-not-a-real-program"));
    }

    #[test]
    fn runs_in_the_requested_directory() {
        let dir = TempDir::new().unwrap();
        let executor = CommandExecutor::in_dir(dir.path());
        executor.run(&["touch", "marker"]).unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
