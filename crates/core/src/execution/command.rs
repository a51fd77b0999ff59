//! Shell command execution with captured output.
//!
//! The working directory is always passed per spawn; nothing in this crate
//! touches the process-global current directory.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

/// Captured output of a command that exited successfully.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Why a command run failed. A command that could not be spawned at all
/// travels the same channel as one that ran and exited nonzero.
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// The command ran and exited nonzero (-1 when killed by a signal).
    #[error("Command exited with code {code}")]
    Exit {
        stdout: String,
        stderr: String,
        code: i32,
    },

    /// The process could not be spawned.
    #[error("Failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Join a command and its arguments into one line for the shell.
pub fn shell_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Run `command args...` through `sh -c` in `dir`, capturing stdout and
/// stderr.
pub async fn run_shell_command(
    command: &str,
    args: &[String],
    dir: &Path,
) -> Result<CommandOutput, CommandFailure> {
    let line = shell_line(command, args);

    let output = Command::new("sh")
        .arg("-c")
        .arg(&line)
        .current_dir(dir)
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        Err(CommandFailure::Exit {
            stdout,
            stderr,
            code: output.status.code().unwrap_or(-1),
        })
    }
}
