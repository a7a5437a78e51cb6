//! Traffic planner — pure increment computation for linear rollouts.

/// One planned traffic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    /// How much this step adds.
    pub increment: u32,
    /// Cumulative percentage after applying it.
    pub next_pct: u32,
}

/// Compute the next traffic step, or `None` when the rollout has
/// reached (or can no longer reach) the final percentage.
///
/// The increment is clamped to the remaining distance, so the last step
/// lands exactly on `final_pct` with no overshoot.
pub fn next_step(current_pct: u32, step_pct: u32, final_pct: u32) -> Option<PlanStep> {
    if current_pct >= final_pct {
        return None;
    }
    let increment = step_pct.min(final_pct - current_pct);
    if increment == 0 {
        // A zero step can never make progress; validation rejects this
        // combination up front.
        return None;
    }
    Some(PlanStep {
        increment,
        next_pct: current_pct + increment,
    })
}
