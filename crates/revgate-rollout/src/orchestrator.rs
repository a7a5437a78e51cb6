//! Deployment orchestrator — drives the rollout state machine.
//!
//! One `Deployment` per run. All mutating platform commands flow
//! through here, strictly serialized; the health monitor's probes are
//! the only concurrent work. No step is retried — a failure propagates
//! to the failure handler, which rolls back when anything was mutated.

use tracing::{debug, error, info, warn};

use revgate_azure::{AzClient, CommandExecutor};
use revgate_core::{DeploymentParameters, DeploymentSession};
use revgate_monitor::{HealthMonitor, HttpProber};

use crate::error::{DeployError, DeploymentOutcome};
use crate::planner::next_step;
use crate::rollback::RollbackPlan;

/// Where in the state machine a deployment currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Init,
    EnsureMultiRevisionMode,
    CreateRevision,
    RolloutCanary,
    RolloutLinear,
    Finalize,
    RollingBack,
    Succeeded,
    RolledBack,
    Failed,
}

/// A single deployment run.
pub struct Deployment<'a, E, H> {
    params: &'a DeploymentParameters,
    client: &'a AzClient<E>,
    prober: &'a H,
    phase: DeployPhase,
}

impl<'a, E: CommandExecutor, H: HttpProber> Deployment<'a, E, H> {
    pub fn new(params: &'a DeploymentParameters, client: &'a AzClient<E>, prober: &'a H) -> Self {
        Self {
            params,
            client,
            prober,
            phase: DeployPhase::Init,
        }
    }

    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    /// Run the deployment to a terminal state.
    pub async fn run(&mut self) -> DeploymentOutcome {
        self.phase = DeployPhase::Init;
        let resource = match self.client.describe().await {
            Ok(resource) => resource,
            Err(e) => {
                // Nothing has been touched yet; fail without rollback.
                error!(error = %e, "could not describe container app");
                self.phase = DeployPhase::Failed;
                return DeploymentOutcome::Failed {
                    error: e.into(),
                    rollback_error: None,
                };
            }
        };

        let mut session = DeploymentSession::new(resource);
        let plan = RollbackPlan::capture(&session);
        debug!(
            prior_mode = %session.prior_mode,
            prior_traffic = %plan.weight_args(),
            "captured pre-deployment state"
        );

        match self.drive(&mut session).await {
            Ok(()) => {
                self.phase = DeployPhase::Succeeded;
                DeploymentOutcome::Succeeded
            }
            Err(e) => self.handle_failure(&session, &plan, e).await,
        }
    }

    /// The happy path; any error falls through to the failure handler.
    async fn drive(&mut self, session: &mut DeploymentSession) -> Result<(), DeployError> {
        use revgate_core::RevisionMode::Multiple;

        self.phase = DeployPhase::EnsureMultiRevisionMode;
        if session.prior_mode != Multiple {
            info!("switching revision mode to multiple");
            session.record_mutation();
            self.client.set_revision_mode(Multiple).await?;
            session.mode_changed = true;
        }

        self.phase = DeployPhase::CreateRevision;
        let revision = self.params.new_revision_name();
        info!(%revision, image = %self.params.image, "creating new revision");
        session.record_mutation();
        let updated = self
            .client
            .update_image(&self.params.revision_suffix, &self.params.image)
            .await?;
        if !updated.provisioning_succeeded() {
            return Err(DeployError::Provisioning);
        }

        info!(%revision, "starting deployment of new revision");
        let monitor = HealthMonitor::new(self.client, self.prober, self.params);

        if self.params.canary {
            self.phase = DeployPhase::RolloutCanary;
            info!("commencing canary deployment");

            self.apply_weight(session, &revision, self.params.step_pct)
                .await?;
            info!(
                pct = self.params.step_pct,
                "monitoring canary traffic share"
            );
            monitor.run_window(session).await?;

            self.apply_weight(session, &revision, self.params.final_pct)
                .await?;
        } else {
            self.phase = DeployPhase::RolloutLinear;
            info!("commencing linear deployment");

            while let Some(step) = next_step(
                session.current_pct,
                self.params.step_pct,
                self.params.final_pct,
            ) {
                self.apply_weight(session, &revision, step.next_pct).await?;
                info!(
                    increment = step.increment,
                    pct = step.next_pct,
                    "traffic shifted, monitoring"
                );
                monitor.run_window(session).await?;
            }

            // The planner must land exactly on the final percentage; a
            // mismatch is a planner bug, not a deployment failure.
            if session.current_pct != self.params.final_pct {
                return Err(DeployError::Internal(format!(
                    "rollout ended at {}% instead of {}%",
                    session.current_pct, self.params.final_pct
                )));
            }
        }

        self.phase = DeployPhase::Finalize;
        info!(pct = self.params.final_pct, "running final health pass");
        monitor.run_window(session).await?;

        if session.mode_changed {
            info!(mode = %session.prior_mode, "restoring original revision mode");
            self.client.set_revision_mode(session.prior_mode).await?;
        }

        info!(%revision, "successfully deployed");
        // Diagnostic only — a failed read must not fail a finished
        // deployment.
        match self.client.describe_raw().await {
            Ok(dump) => info!("final resource state:\n{dump}"),
            Err(e) => warn!(error = %e, "could not fetch final resource state"),
        }
        Ok(())
    }

    /// Apply one traffic shift and record it on the session.
    async fn apply_weight(
        &self,
        session: &mut DeploymentSession,
        revision: &str,
        pct: u32,
    ) -> Result<(), DeployError> {
        session.record_mutation();
        self.client
            .set_traffic(&format!("{revision}={pct}"))
            .await?;
        session.record_shift(revision, pct);
        debug_assert_eq!(session.traffic.total_weight(), 100);
        Ok(())
    }

    /// Failure handler: roll back if anything was mutated; on rollback
    /// failure, dump remote state for the operator and stop.
    async fn handle_failure(
        &mut self,
        session: &DeploymentSession,
        plan: &RollbackPlan,
        failure: DeployError,
    ) -> DeploymentOutcome {
        error!(error = %failure, "deployment failed");

        if !session.mutated {
            self.phase = DeployPhase::Failed;
            return DeploymentOutcome::Failed {
                error: failure,
                rollback_error: None,
            };
        }

        self.phase = DeployPhase::RollingBack;
        info!("commencing rollback to initial revision settings");
        match plan.restore(self.client, session.mode_changed).await {
            Ok(()) => {
                self.phase = DeployPhase::RolledBack;
                info!("rollback complete");
                DeploymentOutcome::RolledBack { error: failure }
            }
            Err(rollback_error) => {
                error!(error = %rollback_error, "rollback failed, manual intervention required");
                match self.client.describe_raw().await {
                    Ok(dump) => info!("current resource state:\n{dump}"),
                    Err(e) => warn!(error = %e, "could not fetch resource state for diagnosis"),
                }
                self.phase = DeployPhase::Failed;
                DeploymentOutcome::Failed {
                    error: failure,
                    rollback_error: Some(rollback_error),
                }
            }
        }
    }
}
