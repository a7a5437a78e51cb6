//! Traffic weight state — the revision → weight mapping.
//!
//! Captured verbatim from the describe snapshot before any mutation (for
//! rollback), and maintained locally by the orchestrator as its model of
//! the platform's weight map while the rollout shifts traffic.

use crate::resource::ContainerAppResource;

/// Sentinel name for the unnamed current revision.
pub const LATEST: &str = "latest";

/// One revision's share of incoming traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficTarget {
    pub revision: String,
    pub weight: u32,
}

/// Ordered mapping from revision name (or [`LATEST`]) to an integer
/// weight in 0..=100.
///
/// Invariant: entries with weight > 0 sum to 100 at every externally
/// observable point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficState {
    targets: Vec<TrafficTarget>,
}

impl TrafficState {
    /// Capture the current weight map from a resource snapshot.
    ///
    /// Only entries carrying weight are recorded; an entry without a
    /// revision name is the unnamed current revision and becomes
    /// [`LATEST`], which `az` accepts back on restore.
    pub fn from_resource(resource: &ContainerAppResource) -> Self {
        let targets = resource
            .traffic_entries()
            .iter()
            .filter(|e| e.weight > 0)
            .map(|e| TrafficTarget {
                revision: e
                    .revision_name
                    .clone()
                    .unwrap_or_else(|| LATEST.to_string()),
                weight: e.weight,
            })
            .collect();
        Self { targets }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        Self {
            targets: pairs
                .iter()
                .map(|(r, w)| TrafficTarget {
                    revision: r.to_string(),
                    weight: *w,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[TrafficTarget] {
        &self.targets
    }

    /// Sum of all positive weights.
    pub fn total_weight(&self) -> u32 {
        self.targets.iter().map(|t| t.weight).sum()
    }

    /// Render the `--revision-weight` argument string: space-separated
    /// `name=weight` pairs, one per weighted revision, with a trailing
    /// space. Restore must reproduce the captured map byte for byte, so
    /// the format is fixed.
    pub fn weight_args(&self) -> String {
        let mut out = String::new();
        for t in &self.targets {
            out.push_str(&t.revision);
            out.push('=');
            out.push_str(&t.weight.to_string());
            out.push(' ');
        }
        out
    }

    /// Model the effect of directing `pct` percent of traffic to
    /// `revision`: that revision gets `pct`, the first previously
    /// weighted revision keeps the remainder, and every other entry
    /// drops to zero (and out of the map). Keeps the sum-to-100
    /// invariant without a round trip to the platform.
    pub fn shift_to(&mut self, revision: &str, pct: u32) {
        debug_assert!(pct <= 100);
        let remainder = 100 - pct;

        let prior: Vec<TrafficTarget> = self
            .targets
            .iter()
            .filter(|t| t.revision != revision && t.weight > 0)
            .cloned()
            .collect();

        self.targets.clear();
        if pct > 0 {
            self.targets.push(TrafficTarget {
                revision: revision.to_string(),
                weight: pct,
            });
        }
        if remainder > 0 {
            let holdover = prior
                .first()
                .map(|t| t.revision.clone())
                .unwrap_or_else(|| LATEST.to_string());
            self.targets.push(TrafficTarget {
                revision: holdover,
                weight: remainder,
            });
        }
    }
}
