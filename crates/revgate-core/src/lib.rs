//! revgate-core — shared data model for the revgate deployment gate.
//!
//! Holds the immutable [`DeploymentParameters`] assembled at startup, the
//! [`TrafficState`] weight map captured from (and modeled against) the
//! platform, the orchestrator-owned [`DeploymentSession`], and typed views
//! of the `az` CLI's JSON output.
//!
//! Nothing in this crate talks to the platform; it is pure data shared by
//! the command layer, the health monitor, and the rollout orchestrator.

pub mod error;
pub mod params;
pub mod resource;
pub mod session;
pub mod traffic;

pub use error::ValidationError;
pub use params::{DeploymentParameters, ParameterInputs};
pub use resource::{ContainerAppResource, RevisionMode};
pub use session::DeploymentSession;
pub use traffic::TrafficState;
