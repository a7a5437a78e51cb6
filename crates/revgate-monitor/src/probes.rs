//! The probe set — three independent read-only health checks.

use tracing::{debug, info, warn};

use revgate_azure::{AzClient, CommandError, CommandExecutor};
use revgate_core::DeploymentParameters;
use thiserror::Error;

/// A probe verdict that fails the monitoring window.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("endpoint probe failed for {url}: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("error marker found in system logs for revision {revision}")]
    LogErrors { revision: String },

    #[error(
        "5xx ratio {ratio:.3} exceeded threshold {threshold} \
         ({server_errors} of {total} requests)"
    )]
    ErrorRate {
        ratio: f64,
        threshold: f64,
        server_errors: f64,
        total: f64,
    },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Response from probing a user endpoint.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client seam for the endpoint probe. `Err` is a transport-level
/// failure (connect, TLS, timeout) described as text.
pub trait HttpProber {
    fn get(&self, url: &str) -> impl Future<Output = Result<ProbeResponse, String>> + Send;
}

/// Real prober backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpProber for HttpClient {
    async fn get(&self, url: &str) -> Result<ProbeResponse, String> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|e| {
            debug!(error = %e, "could not read probe response body");
            String::new()
        });
        Ok(ProbeResponse { status, body })
    }
}

/// Request counts per status class observed since the window start.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthSample {
    /// Counts for 2xx, 3xx, 4xx, 5xx.
    pub counts: [f64; 4],
}

impl HealthSample {
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn server_errors(&self) -> f64 {
        self.counts[3]
    }

    /// 5xx share of all requests. `None` when no traffic has been
    /// observed yet — insufficient data, not a failure.
    pub fn server_error_ratio(&self) -> Option<f64> {
        let total = self.total();
        (total > 0.0).then(|| self.server_errors() / total)
    }

    /// Gate the sample against the configured threshold.
    pub fn check(&self, threshold: f64) -> Result<(), ProbeError> {
        match self.server_error_ratio() {
            Some(ratio) if ratio > threshold => Err(ProbeError::ErrorRate {
                ratio,
                threshold,
                server_errors: self.server_errors(),
                total: self.total(),
            }),
            Some(ratio) => {
                debug!(ratio, threshold, "error ratio within threshold");
                Ok(())
            }
            None => {
                debug!("no requests observed yet, skipping error-ratio gate");
                Ok(())
            }
        }
    }
}

/// GET every configured endpoint; any non-2xx or transport error fails
/// the probe, naming the offending URL. An empty list is a skip.
pub async fn probe_endpoints<H: HttpProber>(
    prober: &H,
    endpoints: &[String],
) -> Result<(), ProbeError> {
    for url in endpoints {
        match prober.get(url).await {
            Ok(response) if response.ok() => {
                info!(%url, status = response.status, "endpoint probe passed");
                debug!(body = %response.body, "endpoint response");
            }
            Ok(response) => {
                warn!(%url, status = response.status, "endpoint probe failed");
                return Err(ProbeError::Endpoint {
                    url: url.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            Err(reason) => {
                warn!(%url, %reason, "endpoint probe transport error");
                return Err(ProbeError::Endpoint {
                    url: url.clone(),
                    reason,
                });
            }
        }
    }
    Ok(())
}

/// Query the platform's system logs for the new revision and fail on an
/// error marker. Skipped when no workspace is configured.
pub async fn probe_logs<E: CommandExecutor>(
    client: &AzClient<E>,
    params: &DeploymentParameters,
) -> Result<(), ProbeError> {
    let Some(workspace) = params.log_analytics_workspace.as_deref() else {
        return Ok(());
    };

    let revision = params.new_revision_name();
    let customer_id = client.workspace_customer_id(workspace).await?;
    let results = client.query_revision_logs(&customer_id, &revision).await?;
    debug!(%revision, bytes = results.len(), "log query returned");

    if results.contains("Error") {
        warn!(%revision, "error marker found in system logs");
        return Err(ProbeError::LogErrors { revision });
    }
    debug!("no errors found in system logs");
    Ok(())
}

/// Collect per-status-class request counts for the new revision since
/// the window start and gate the 5xx ratio.
pub async fn probe_metrics<E: CommandExecutor>(
    client: &AzClient<E>,
    params: &DeploymentParameters,
    resource_id: &str,
    start_time: &str,
) -> Result<HealthSample, ProbeError> {
    let revision = params.new_revision_name();
    let mut sample = HealthSample::default();
    for class in 2..=5u32 {
        let count = client
            .revision_request_count(resource_id, &revision, class, start_time)
            .await?;
        sample.counts[(class - 2) as usize] = count;
    }
    info!(
        "2xx: {}, 3xx: {}, 4xx: {}, 5xx: {}",
        sample.counts[0], sample.counts[1], sample.counts[2], sample.counts[3]
    );
    sample.check(params.error_threshold)?;
    Ok(sample)
}
