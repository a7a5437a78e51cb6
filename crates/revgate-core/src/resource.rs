//! Typed views of the `az containerapp` / `az monitor` JSON output.
//!
//! Only the fields revgate reads are modeled; everything else in the
//! platform's (large) resource document is ignored by serde.

use serde::Deserialize;

/// Whether the platform routes traffic to one revision or splits it
/// across several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionMode {
    Single,
    Multiple,
}

impl RevisionMode {
    /// Parse the `activeRevisionsMode` field. Anything that is not
    /// "multiple" routes all traffic to a single revision.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("multiple") {
            RevisionMode::Multiple
        } else {
            RevisionMode::Single
        }
    }

    /// The literal accepted by `az containerapp revision set-mode`.
    pub fn as_arg(self) -> &'static str {
        match self {
            RevisionMode::Single => "single",
            RevisionMode::Multiple => "multiple",
        }
    }
}

impl std::fmt::Display for RevisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// The resource document returned by `az containerapp show` (and by
/// `az containerapp update`, which echoes the updated resource back).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAppResource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub properties: ResourceProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    pub configuration: ResourceConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfiguration {
    #[serde(default)]
    pub active_revisions_mode: String,
    #[serde(default)]
    pub ingress: Option<Ingress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    #[serde(default)]
    pub traffic: Vec<TrafficEntry>,
}

/// One entry of the ingress traffic array. A missing `revisionName`
/// denotes the unnamed current ("latest") revision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEntry {
    #[serde(default)]
    pub revision_name: Option<String>,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub latest_revision: Option<bool>,
}

impl ContainerAppResource {
    pub fn revision_mode(&self) -> RevisionMode {
        RevisionMode::parse(&self.properties.configuration.active_revisions_mode)
    }

    /// Whether the platform reported the last provisioning operation as
    /// having succeeded.
    pub fn provisioning_succeeded(&self) -> bool {
        self.properties.provisioning_state.as_deref() == Some("Succeeded")
    }

    pub fn traffic_entries(&self) -> &[TrafficEntry] {
        self.properties
            .configuration
            .ingress
            .as_ref()
            .map(|i| i.traffic.as_slice())
            .unwrap_or(&[])
    }
}

/// Response shape of `az monitor metrics list`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub value: Vec<Metric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metric {
    #[serde(default)]
    pub timeseries: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub data: Vec<MetricPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricPoint {
    #[serde(default)]
    pub total: Option<f64>,
}

impl MetricsResponse {
    /// Sum the `total` field over the first timeseries, the way the
    /// platform attributes per-revision request counts. Missing series
    /// or data points count as zero.
    pub fn request_count(&self) -> f64 {
        self.value
            .first()
            .and_then(|m| m.timeseries.first())
            .map(|ts| ts.data.iter().filter_map(|p| p.total).sum())
            .unwrap_or(0.0)
    }
}
