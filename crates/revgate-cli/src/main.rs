//! revgate — health-gated progressive traffic shifting for Azure
//! Container Apps.
//!
//! Reads its configuration from flags or `REVGATE_*` environment
//! variables (the CI runner sets the latter), validates it, and drives
//! one deployment run to a terminal state. Exit code 0 means the new
//! revision took the final traffic share and passed every health gate;
//! anything else is reported with the rollback disposition.

use anyhow::bail;
use clap::Parser;
use tracing::info;

use revgate_azure::{AzCli, AzClient};
use revgate_core::ParameterInputs;
use revgate_monitor::HttpClient;
use revgate_rollout::{Deployment, DeploymentOutcome};

#[derive(Parser)]
#[command(
    name = "revgate",
    about = "Progressively shift traffic to a new container app revision, \
             gated on health probes, with automatic rollback",
    version
)]
struct Cli {
    /// Container app name.
    #[arg(long, env = "REVGATE_APP_NAME")]
    app_name: String,

    /// Resource group the app lives in.
    #[arg(long, env = "REVGATE_RESOURCE_GROUP")]
    resource_group: String,

    /// Image reference to deploy.
    #[arg(long, env = "REVGATE_IMAGE_ID")]
    image_id: String,

    /// Suffix for the new revision ({app}--{suffix}).
    #[arg(long, env = "REVGATE_REVISION_SUFFIX")]
    revision_suffix: String,

    /// Log Analytics workspace to scan for revision errors (omit to
    /// skip the log probe).
    #[arg(long, env = "REVGATE_LOG_ANALYTICS_WORKSPACE", default_value = "")]
    log_analytics_workspace: String,

    /// Canary rollout: one partial jump, then full cut-over.
    #[arg(long, env = "REVGATE_CANARY_DEPLOY")]
    canary_deploy: bool,

    /// Traffic percentage added per step (canary: the observation share).
    #[arg(long, env = "REVGATE_STEP_PCT", default_value_t = 10)]
    step_pct: u32,

    /// Minutes to monitor after each traffic shift.
    #[arg(long, env = "REVGATE_STEP_TIME", default_value_t = 5.0)]
    step_time: f64,

    /// Final traffic percentage for the new revision.
    #[arg(long, env = "REVGATE_FINAL_PCT", default_value_t = 100)]
    final_pct: u32,

    /// Endpoint URLs to probe, separated by comma, semicolon, or
    /// newline.
    #[arg(long, env = "REVGATE_API_ENDPOINTS_TO_TEST", default_value = "")]
    api_endpoints_to_test: String,

    /// Minutes between probe cycles within a monitoring window.
    #[arg(long, env = "REVGATE_MONITOR_INTERVAL", default_value_t = 1.0)]
    monitor_interval: f64,

    /// Maximum tolerated 5xx request ratio (fraction, 0-1).
    #[arg(long, env = "REVGATE_ERROR_THRESHOLD", default_value_t = 0.05)]
    error_threshold: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,revgate=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let params = ParameterInputs {
        app: cli.app_name,
        resource_group: cli.resource_group,
        image: cli.image_id,
        revision_suffix: cli.revision_suffix,
        log_analytics_workspace: cli.log_analytics_workspace,
        canary: cli.canary_deploy,
        step_pct: cli.step_pct,
        final_pct: cli.final_pct,
        step_time_mins: cli.step_time,
        monitor_interval_mins: cli.monitor_interval,
        error_threshold: cli.error_threshold,
        endpoints: cli.api_endpoints_to_test,
    }
    .validate()?;

    let client = AzClient::new(params.app.as_str(), params.resource_group.as_str(), AzCli);
    // The containerapp and log-analytics extensions install on first
    // use; keep that from prompting in CI.
    client.enable_dynamic_install().await?;

    let prober = HttpClient::default();
    let mut deployment = Deployment::new(&params, &client, &prober);

    match deployment.run().await {
        DeploymentOutcome::Succeeded => {
            info!(revision = %params.new_revision_name(), "deployment succeeded");
            Ok(())
        }
        DeploymentOutcome::RolledBack { error } => {
            bail!("deployment failed ({error}); prior traffic configuration was restored")
        }
        DeploymentOutcome::Failed {
            error,
            rollback_error: Some(rollback_error),
        } => {
            bail!(
                "deployment failed ({error}) and rollback also failed \
                 ({rollback_error}); manual intervention required"
            )
        }
        DeploymentOutcome::Failed {
            error,
            rollback_error: None,
        } => {
            bail!("deployment failed before any changes were applied: {error}")
        }
    }
}
