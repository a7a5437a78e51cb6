//! Deployment error taxonomy and terminal outcomes.

use thiserror::Error;

use revgate_azure::CommandError;
use revgate_core::ValidationError;
use revgate_monitor::ProbeError;

/// Why a deployment stage failed.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Bad configuration, detected before any mutation.
    #[error("invalid deployment parameters: {0}")]
    Validation(#[from] ValidationError),

    /// A platform command could not be executed or did not complete.
    #[error("platform command error: {0}")]
    Command(#[from] CommandError),

    /// The image update did not report a succeeded provisioning state.
    #[error("container app update failed: provisioning state was not \"Succeeded\"")]
    Provisioning,

    /// A health probe failed its check.
    #[error("health probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// An internal invariant was violated; indicates a bug, not a
    /// deployment problem.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Terminal state of a deployment run.
#[derive(Debug)]
pub enum DeploymentOutcome {
    /// Rollout completed and the final health pass succeeded.
    Succeeded,
    /// The deployment failed and the prior traffic configuration was
    /// restored.
    RolledBack { error: DeployError },
    /// The deployment failed and could not (or did not need to) roll
    /// back: `rollback_error` is `None` when nothing had been mutated
    /// yet, and `Some` when the restore itself failed.
    Failed {
        error: DeployError,
        rollback_error: Option<CommandError>,
    },
}

impl DeploymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Succeeded)
    }
}
