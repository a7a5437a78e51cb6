//! Per-run deployment session.
//!
//! Owned exclusively by the orchestrating task; components receive it by
//! reference. Discarded at process exit — nothing here persists.

use chrono::{DateTime, Utc};

use crate::resource::{ContainerAppResource, RevisionMode};
use crate::traffic::TrafficState;

/// Mutable state for one deployment run.
#[derive(Debug, Clone)]
pub struct DeploymentSession {
    /// Resource snapshot fetched at startup.
    pub resource: ContainerAppResource,
    /// Revision mode before we touched anything.
    pub prior_mode: RevisionMode,
    /// Weight map before we touched anything (rollback target).
    pub prior_traffic: TrafficState,
    /// Our model of the platform's current weight map.
    pub traffic: TrafficState,
    /// Cumulative percentage currently directed at the new revision.
    pub current_pct: u32,
    /// Start of the current monitoring window.
    pub window_start: Option<DateTime<Utc>>,
    /// Whether we switched the revision mode (and must restore it).
    pub mode_changed: bool,
    /// Whether any mutating platform command has been issued.
    pub mutated: bool,
}

impl DeploymentSession {
    /// Open a session against a startup snapshot, capturing the prior
    /// traffic map and revision mode before any mutation.
    pub fn new(resource: ContainerAppResource) -> Self {
        let prior_mode = resource.revision_mode();
        let prior_traffic = TrafficState::from_resource(&resource);
        let traffic = prior_traffic.clone();
        Self {
            resource,
            prior_mode,
            prior_traffic,
            traffic,
            current_pct: 0,
            window_start: None,
            mode_changed: false,
            mutated: false,
        }
    }

    /// Record a traffic shift the orchestrator just applied.
    pub fn record_shift(&mut self, revision: &str, pct: u32) {
        self.current_pct = pct;
        self.traffic.shift_to(revision, pct);
        self.mutated = true;
    }

    /// Record any other mutating platform command (mode switch, image
    /// update) so failure handling knows rollback is warranted.
    pub fn record_mutation(&mut self) {
        self.mutated = true;
    }

    /// Begin a monitoring window, returning its start timestamp.
    pub fn open_window(&mut self) -> DateTime<Utc> {
        let start = Utc::now();
        self.window_start = Some(start);
        start
    }
}
