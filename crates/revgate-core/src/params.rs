//! Deployment parameters — raw inputs and their validated form.
//!
//! [`ParameterInputs`] mirrors the configuration surface field for field
//! (the CLI fills it from flags and environment variables);
//! [`ParameterInputs::validate`] produces the immutable
//! [`DeploymentParameters`] the rest of the system reads. Validation
//! failures are hard startup errors, never coerced.

use std::time::Duration;

use crate::error::ValidationError;

/// Raw, unvalidated configuration values.
///
/// Durations are given in minutes (fractional allowed) and percentages as
/// whole numbers, matching the hosting platform's conventions.
#[derive(Debug, Clone, Default)]
pub struct ParameterInputs {
    pub app: String,
    pub resource_group: String,
    pub image: String,
    pub revision_suffix: String,
    /// Log Analytics workspace name; empty means "no log probe".
    pub log_analytics_workspace: String,
    pub canary: bool,
    pub step_pct: u32,
    pub final_pct: u32,
    pub step_time_mins: f64,
    pub monitor_interval_mins: f64,
    /// 5xx error-rate threshold as a fraction in [0, 1].
    pub error_threshold: f64,
    /// Endpoint URLs separated by comma, semicolon, or newline.
    pub endpoints: String,
}

/// Validated, immutable deployment parameters.
///
/// Assembled once at startup and read-only afterward.
#[derive(Debug, Clone)]
pub struct DeploymentParameters {
    pub app: String,
    pub resource_group: String,
    pub image: String,
    pub revision_suffix: String,
    pub log_analytics_workspace: Option<String>,
    pub canary: bool,
    pub step_pct: u32,
    pub final_pct: u32,
    pub step_time: Duration,
    pub monitor_interval: Duration,
    pub error_threshold: f64,
    pub endpoints: Vec<String>,
}

impl ParameterInputs {
    /// Validate the raw inputs and produce [`DeploymentParameters`].
    pub fn validate(self) -> Result<DeploymentParameters, ValidationError> {
        require(&self.app, "appName")?;
        require(&self.resource_group, "resourceGroup")?;
        require(&self.image, "imageID")?;
        require(&self.revision_suffix, "revisionSuffix")?;

        if self.step_pct > 100 {
            return Err(ValidationError::PercentOutOfRange {
                field: "stepPct",
                value: self.step_pct,
            });
        }
        if self.final_pct > 100 {
            return Err(ValidationError::PercentOutOfRange {
                field: "finalPct",
                value: self.final_pct,
            });
        }
        if self.step_pct > self.final_pct {
            return Err(ValidationError::StepExceedsFinal {
                step_pct: self.step_pct,
                final_pct: self.final_pct,
            });
        }
        if self.step_pct == 0 && self.final_pct > 0 {
            return Err(ValidationError::ZeroStep);
        }
        if !self.error_threshold.is_finite()
            || self.error_threshold < 0.0
            || self.error_threshold > 1.0
        {
            return Err(ValidationError::ThresholdOutOfRange(self.error_threshold));
        }

        let step_time = minutes("stepTime", self.step_time_mins)?;
        let monitor_interval = minutes("monitorInterval", self.monitor_interval_mins)?;

        let workspace = self.log_analytics_workspace.trim();
        let log_analytics_workspace = if workspace.is_empty() {
            None
        } else {
            Some(workspace.to_string())
        };

        Ok(DeploymentParameters {
            app: self.app,
            resource_group: self.resource_group,
            image: self.image,
            revision_suffix: self.revision_suffix,
            log_analytics_workspace,
            canary: self.canary,
            step_pct: self.step_pct,
            final_pct: self.final_pct,
            step_time,
            monitor_interval,
            error_threshold: self.error_threshold,
            endpoints: parse_endpoints(&self.endpoints),
        })
    }
}

impl DeploymentParameters {
    /// Full name of the revision this deployment creates: `{app}--{suffix}`.
    pub fn new_revision_name(&self) -> String {
        format!("{}--{}", self.app, self.revision_suffix)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(())
    }
}

fn minutes(field: &'static str, value: f64) -> Result<Duration, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::BadDuration { field, value });
    }
    Ok(Duration::from_secs_f64(value * 60.0))
}

/// Split an endpoint list on comma, semicolon, or newline, dropping
/// whitespace and empty entries.
fn parse_endpoints(raw: &str) -> Vec<String> {
    raw.split([',', ';', '\n'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
