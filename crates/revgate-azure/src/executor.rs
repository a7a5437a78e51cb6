//! Command execution — the process-spawning seam.
//!
//! A child process ends one of three ways and the outcome reports all
//! three distinctly; in particular a signal-terminated process is
//! [`CommandOutcome::Terminated`], not an error and not success. Callers
//! decide what termination means for them (revgate's callers require
//! [`CommandOutcome::Completed`] everywhere).

use std::process::ExitStatus;

use tracing::{debug, trace};

use crate::error::CommandError;

/// How a platform command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exited with status zero.
    Completed { stdout: String },
    /// Killed by a signal before it could exit.
    Terminated { signal: Option<i32> },
    /// Exited with a non-zero status.
    Failed { code: Option<i32>, stderr: String },
}

/// Executes a platform command string and reports its outcome.
///
/// `Err` is reserved for not being able to run the command at all
/// (spawn failure); everything the child itself does is a
/// [`CommandOutcome`].
pub trait CommandExecutor {
    fn execute(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandOutcome, CommandError>> + Send;
}

/// Real executor: runs the command through the shell, the same way the
/// CI runner would.
#[derive(Debug, Clone, Default)]
pub struct AzCli;

impl CommandExecutor for AzCli {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        debug!(%command, "running platform command");

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(CommandError::Spawn)?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            trace!(bytes = stdout.len(), "platform command completed");
            return Ok(CommandOutcome::Completed { stdout });
        }

        if let Some(signal) = termination_signal(&output.status) {
            debug!(signal, "platform command terminated by signal");
            return Ok(CommandOutcome::Terminated {
                signal: Some(signal),
            });
        }

        Ok(CommandOutcome::Failed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
