//! Rollback — captured prior state and its verbatim restore.

use tracing::{info, warn};

use revgate_azure::{AzClient, CommandError, CommandExecutor};
use revgate_core::{DeploymentSession, RevisionMode};

/// The pre-deployment state a failed rollout returns to.
///
/// Captured once, before any mutation; restoring re-issues the captured
/// weight string byte for byte, however much the session shifted
/// weights afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackPlan {
    weight_args: String,
    prior_mode: RevisionMode,
}

impl RollbackPlan {
    pub fn capture(session: &DeploymentSession) -> Self {
        Self {
            weight_args: session.prior_traffic.weight_args(),
            prior_mode: session.prior_mode,
        }
    }

    /// The exact `--revision-weight` argument a restore will issue.
    pub fn weight_args(&self) -> &str {
        &self.weight_args
    }

    /// Restore the prior traffic configuration, then the prior revision
    /// mode if the rollout changed it. Attempted at most once; the
    /// caller handles a failure by dumping remote state and giving up.
    pub async fn restore<E: CommandExecutor>(
        &self,
        client: &AzClient<E>,
        mode_changed: bool,
    ) -> Result<(), CommandError> {
        if self.weight_args.is_empty() {
            // The app had no weighted ingress to begin with; there is
            // no traffic configuration to put back.
            warn!("no prior traffic configuration captured, skipping traffic restore");
        } else {
            info!(weights = %self.weight_args, "restoring prior traffic configuration");
            client.set_traffic(&self.weight_args).await?;
        }
        if mode_changed {
            info!(mode = %self.prior_mode, "restoring prior revision mode");
            client.set_revision_mode(self.prior_mode).await?;
        }
        Ok(())
    }
}
