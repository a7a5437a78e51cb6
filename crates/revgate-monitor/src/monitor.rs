//! The deadline-bounded monitoring loop.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use revgate_azure::{AzClient, CommandExecutor};
use revgate_core::{DeploymentParameters, DeploymentSession};

use crate::probes::{self, HttpProber, ProbeError};

/// What a completed monitoring window observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    /// Number of probe cycles that ran.
    pub cycles: u32,
}

/// Runs the probe set on a timer until the window deadline elapses.
pub struct HealthMonitor<'a, E, H> {
    client: &'a AzClient<E>,
    prober: &'a H,
    params: &'a DeploymentParameters,
}

impl<'a, E: CommandExecutor, H: HttpProber> HealthMonitor<'a, E, H> {
    pub fn new(client: &'a AzClient<E>, prober: &'a H, params: &'a DeploymentParameters) -> Self {
        Self {
            client,
            prober,
            params,
        }
    }

    /// Run one monitoring window: deadline at `now + step_time`, one
    /// probe cycle per `monitor_interval`.
    ///
    /// The deadline is re-checked after each cycle, so at least one
    /// cycle always runs — even when the interval exceeds the window.
    /// The first probe failure aborts the window immediately.
    pub async fn run_window(
        &self,
        session: &mut DeploymentSession,
    ) -> Result<MonitorReport, ProbeError> {
        let start = session.open_window();
        let start_time = start.format("%Y-%m-%dT%H:%M:%S").to_string();
        let resource_id = session.resource.id.clone();
        let deadline = Instant::now() + self.params.step_time;

        let mut cycles = 0u32;
        loop {
            info!(
                wait_secs = self.params.monitor_interval.as_secs(),
                "waiting before next probe cycle"
            );
            tokio::time::sleep(self.params.monitor_interval).await;

            info!(cycle = cycles + 1, "running probes");
            self.run_cycle(&resource_id, &start_time).await?;
            cycles += 1;

            if Instant::now() >= deadline {
                break;
            }
        }

        debug!(cycles, "monitoring window passed");
        Ok(MonitorReport { cycles })
    }

    /// One probe cycle: the three probes run concurrently; the first
    /// failure wins and the rest are dropped.
    async fn run_cycle(&self, resource_id: &str, start_time: &str) -> Result<(), ProbeError> {
        tokio::try_join!(
            probes::probe_endpoints(self.prober, &self.params.endpoints),
            probes::probe_logs(self.client, self.params),
            async {
                probes::probe_metrics(self.client, self.params, resource_id, start_time)
                    .await
                    .map(drop)
            },
        )?;
        Ok(())
    }
}

/// Expected steady-state cycle count for a window (useful for logs and
/// tests): one cycle per interval, minimum one.
pub fn expected_cycles(step_time: Duration, interval: Duration) -> u32 {
    if interval.is_zero() || step_time <= interval {
        return 1;
    }
    step_time.div_duration_f64(interval).ceil() as u32
}
