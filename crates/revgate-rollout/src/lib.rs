//! revgate-rollout — the deployment state machine.
//!
//! Drives a progressive traffic shift end to end:
//!
//! ```text
//! Init → EnsureMultiRevisionMode → CreateRevision
//!      → RolloutCanary | RolloutLinear → Finalize → Succeeded
//! ```
//!
//! with any failure after the first mutation entering
//! `RollingBack → RolledBack | Failed`.
//!
//! # Components
//!
//! - **`planner`** — pure traffic-increment computation
//! - **`rollback`** — captured prior state and its verbatim restore
//! - **`orchestrator`** — the [`Deployment`] state machine
//!
//! Expected failure modes (probe failure, provisioning failure, command
//! failure) are values: every stage returns a `Result` the orchestrator
//! inspects, and the run as a whole ends in a [`DeploymentOutcome`].

pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod rollback;

pub use error::{DeployError, DeploymentOutcome};
pub use orchestrator::{DeployPhase, Deployment};
pub use planner::{PlanStep, next_step};
pub use rollback::RollbackPlan;
