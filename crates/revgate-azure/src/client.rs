//! Typed `az` surface for one container app.
//!
//! All command strings are built here, in one place, so tests can assert
//! them byte for byte (rollback fidelity depends on that).

use serde_json::from_str;
use tracing::debug;

use revgate_core::resource::{ContainerAppResource, MetricsResponse, RevisionMode};

use crate::error::CommandError;
use crate::executor::{CommandExecutor, CommandOutcome};

/// Queries and mutations against a single container app, by name and
/// resource group.
#[derive(Debug, Clone)]
pub struct AzClient<E> {
    app: String,
    resource_group: String,
    exec: E,
}

impl<E: CommandExecutor> AzClient<E> {
    pub fn new(app: impl Into<String>, resource_group: impl Into<String>, exec: E) -> Self {
        Self {
            app: app.into(),
            resource_group: resource_group.into(),
            exec,
        }
    }

    /// Run a command and require it to complete. Termination and
    /// non-zero exits both become errors here; revgate has no command
    /// whose termination is acceptable.
    async fn completed(&self, command: String) -> Result<String, CommandError> {
        match self.exec.execute(&command).await? {
            CommandOutcome::Completed { stdout } => Ok(stdout),
            CommandOutcome::Terminated { signal } => {
                Err(CommandError::Terminated { command, signal })
            }
            CommandOutcome::Failed { code, stderr } => Err(CommandError::Failed {
                command,
                code,
                stderr,
            }),
        }
    }

    /// Allow the `containerapp` and `log-analytics` CLI extensions to
    /// install on first use without prompting.
    pub async fn enable_dynamic_install(&self) -> Result<(), CommandError> {
        self.completed("az config set extension.use_dynamic_install=yes_without_prompt".to_string())
            .await
            .map(drop)
    }

    /// Fetch and parse the app's resource description.
    pub async fn describe(&self) -> Result<ContainerAppResource, CommandError> {
        let raw = self.describe_raw().await?;
        from_str(&raw).map_err(|source| CommandError::Parse {
            what: "containerapp show",
            source,
        })
    }

    /// Fetch the app's resource description as raw JSON text (used for
    /// the rollback-failure diagnostic dump).
    pub async fn describe_raw(&self) -> Result<String, CommandError> {
        self.completed(format!(
            "az containerapp show -n {} -g {}",
            self.app, self.resource_group
        ))
        .await
    }

    /// Update the app's image under a new revision suffix. Returns the
    /// updated resource the platform echoes back.
    pub async fn update_image(
        &self,
        revision_suffix: &str,
        image: &str,
    ) -> Result<ContainerAppResource, CommandError> {
        let raw = self
            .completed(format!(
                "az containerapp update -n {} -g {} --revision-suffix {} --image {}",
                self.app, self.resource_group, revision_suffix, image
            ))
            .await?;
        from_str(&raw).map_err(|source| CommandError::Parse {
            what: "containerapp update",
            source,
        })
    }

    /// Apply a weight map in one shot. `weight_args` is the
    /// space-separated `revision=weight` list ("latest" for the unnamed
    /// revision) and is passed through verbatim.
    pub async fn set_traffic(&self, weight_args: &str) -> Result<(), CommandError> {
        self.completed(format!(
            "az containerapp ingress traffic set -n {} -g {} --revision-weight {}",
            self.app, self.resource_group, weight_args
        ))
        .await
        .map(drop)
    }

    pub async fn set_revision_mode(&self, mode: RevisionMode) -> Result<(), CommandError> {
        self.completed(format!(
            "az containerapp revision set-mode -n {} -g {} --mode {}",
            self.app,
            self.resource_group,
            mode.as_arg()
        ))
        .await
        .map(drop)
    }

    /// Resolve a Log Analytics workspace name to its customer id (the
    /// id the query endpoint wants).
    pub async fn workspace_customer_id(&self, workspace: &str) -> Result<String, CommandError> {
        let raw = self
            .completed(format!(
                "az monitor log-analytics workspace show --query customerId -g {} -n {}",
                self.resource_group, workspace
            ))
            .await?;
        // Output is a bare JSON string: "<guid>".
        let id: String = from_str(raw.trim()).map_err(|source| CommandError::Parse {
            what: "workspace customerId",
            source,
        })?;
        if id.is_empty() {
            return Err(CommandError::EmptyOutput {
                what: "workspace customerId",
            });
        }
        Ok(id)
    }

    /// Query the platform's system logs for a revision, as table text.
    pub async fn query_revision_logs(
        &self,
        customer_id: &str,
        revision: &str,
    ) -> Result<String, CommandError> {
        self.completed(format!(
            "az monitor log-analytics query --workspace {customer_id} --analytics-query \
             \"ContainerAppSystemLogs_CL | where RevisionName_s == '{revision}' | project Log_s, TimeGenerated\" \
             --out table"
        ))
        .await
    }

    /// Total request count for one status class (2..=5, meaning
    /// "2xx".."5xx") attributed to a revision since `start_time`.
    pub async fn revision_request_count(
        &self,
        resource_id: &str,
        revision: &str,
        status_class: u32,
        start_time: &str,
    ) -> Result<f64, CommandError> {
        debug_assert!((2..=5).contains(&status_class));
        let raw = self
            .completed(format!(
                "az monitor metrics list --resource {resource_id} --metric \"Requests\" \
                 --filter \"statusCodeCategory eq '{status_class}xx' and revisionName eq '{revision}'\" \
                 --start-time {start_time}"
            ))
            .await?;
        let response: MetricsResponse = from_str(&raw).map_err(|source| CommandError::Parse {
            what: "metrics list",
            source,
        })?;
        let count = response.request_count();
        debug!(status_class, count, "revision request count");
        Ok(count)
    }
}
