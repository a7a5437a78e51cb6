//! revgate-monitor — health validation for an in-flight traffic shift.
//!
//! A monitoring window is a wall-clock deadline (`now + step_time`);
//! until it elapses, the [`HealthMonitor`] waits one interval, runs the
//! full probe set once, and re-checks the deadline. At least one probe
//! cycle always runs per window.
//!
//! The probe set is three independent read-only checks, run concurrently
//! with first-failure-wins:
//!
//! - **endpoint** — GET each user-supplied URL, require 2xx
//! - **logs** — scan platform system logs for the new revision
//! - **metrics** — 5xx request ratio against the error threshold
//!
//! Any probe failure ends the window (and the deployment step)
//! immediately; there is no retry or averaging across cycles.

pub mod monitor;
pub mod probes;

pub use monitor::{HealthMonitor, MonitorReport};
pub use probes::{HealthSample, HttpClient, HttpProber, ProbeError, ProbeResponse};
