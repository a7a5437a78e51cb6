//! End-to-end deployment scenarios against a scripted platform.
//!
//! The fake executor answers the same `az` commands the real CLI would,
//! records everything it is asked to run, and lets each scenario shape
//! the remote state (revision mode, prior traffic, provisioning result,
//! request counts).

use std::sync::Mutex;

use revgate_azure::{AzClient, CommandError, CommandExecutor, CommandOutcome};
use revgate_core::{DeploymentParameters, ParameterInputs};
use revgate_monitor::{HttpProber, ProbeError, ProbeResponse};
use revgate_rollout::{DeployError, DeployPhase, Deployment, DeploymentOutcome};

struct FakeAz {
    /// Initial `activeRevisionsMode`.
    mode: &'static str,
    /// Initial ingress traffic array (JSON).
    traffic: &'static str,
    /// `provisioningState` echoed by the update command.
    provisioning_state: &'static str,
    /// Request counts for 2xx..5xx.
    counts: [f64; 4],
    /// Whether describe commands fail.
    fail_describe: bool,
    /// Whether traffic-set commands fail.
    fail_traffic_set: bool,
    commands: Mutex<Vec<String>>,
}

impl FakeAz {
    fn healthy() -> Self {
        Self {
            mode: "Single",
            traffic: r#"[ { "revisionName": "shop--v1", "weight": 100 } ]"#,
            provisioning_state: "Succeeded",
            counts: [100.0, 0.0, 0.0, 0.0],
            fail_describe: false,
            fail_traffic_set: false,
            commands: Mutex::new(Vec::new()),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn traffic_set_args(&self) -> Vec<String> {
        self.commands()
            .iter()
            .filter_map(|c| {
                c.split_once("--revision-weight ")
                    .map(|(_, args)| args.to_string())
            })
            .collect()
    }

    fn count_matching(&self, needle: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }

    fn describe_json(&self) -> String {
        format!(
            r#"{{
                "id": "/apps/shop",
                "name": "shop",
                "properties": {{ "configuration": {{
                    "activeRevisionsMode": "{}",
                    "ingress": {{ "traffic": {} }}
                }} }}
            }}"#,
            self.mode, self.traffic
        )
    }
}

impl CommandExecutor for &FakeAz {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        self.commands.lock().unwrap().push(command.to_string());

        let fail = |stderr: &str| {
            Ok(CommandOutcome::Failed {
                code: Some(1),
                stderr: stderr.to_string(),
            })
        };

        if command.contains("containerapp show") {
            if self.fail_describe {
                return fail("ERROR: app not found");
            }
            return Ok(CommandOutcome::Completed {
                stdout: self.describe_json(),
            });
        }
        if command.contains("containerapp update") {
            return Ok(CommandOutcome::Completed {
                stdout: format!(
                    r#"{{
                        "id": "/apps/shop",
                        "properties": {{
                            "provisioningState": "{}",
                            "configuration": {{ "activeRevisionsMode": "Multiple" }}
                        }}
                    }}"#,
                    self.provisioning_state
                ),
            });
        }
        if command.contains("ingress traffic set") {
            if self.fail_traffic_set {
                return fail("ERROR: traffic update rejected");
            }
            return Ok(CommandOutcome::Completed {
                stdout: String::new(),
            });
        }
        if command.contains("revision set-mode") {
            return Ok(CommandOutcome::Completed {
                stdout: String::new(),
            });
        }
        if command.contains("metrics list") {
            let class: usize = ('2'..='5')
                .position(|c| command.contains(&format!("statusCodeCategory eq '{c}xx'")))
                .expect("metrics command names a status class");
            return Ok(CommandOutcome::Completed {
                stdout: format!(
                    r#"{{ "value": [ {{ "timeseries": [ {{ "data": [ {{ "total": {} }} ] }} ] }} ] }}"#,
                    self.counts[class]
                ),
            });
        }
        panic!("unexpected command: {command}");
    }
}

struct OkProber;

impl HttpProber for OkProber {
    async fn get(&self, _url: &str) -> Result<ProbeResponse, String> {
        Ok(ProbeResponse {
            status: 200,
            body: String::new(),
        })
    }
}

struct FailingProber;

impl HttpProber for FailingProber {
    async fn get(&self, _url: &str) -> Result<ProbeResponse, String> {
        Ok(ProbeResponse {
            status: 503,
            body: String::new(),
        })
    }
}

/// Parameters with zero-length windows so each monitor pass runs
/// exactly one probe cycle without sleeping.
fn params(canary: bool, step_pct: u32, final_pct: u32) -> DeploymentParameters {
    ParameterInputs {
        app: "shop".into(),
        resource_group: "prod-rg".into(),
        image: "registry/shop:v2".into(),
        revision_suffix: "v2".into(),
        log_analytics_workspace: String::new(),
        canary,
        step_pct,
        final_pct,
        step_time_mins: 0.0,
        monitor_interval_mins: 0.0,
        error_threshold: 0.1,
        endpoints: String::new(),
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn linear_rollout_shifts_in_planned_increments() {
    let az = FakeAz::healthy();
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 30, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    let outcome = deployment.run().await;
    assert!(outcome.is_success());
    assert_eq!(deployment.phase(), DeployPhase::Succeeded);

    assert_eq!(
        az.traffic_set_args(),
        vec!["shop--v2=30", "shop--v2=60", "shop--v2=90", "shop--v2=100"]
    );
    // One probe cycle per window, four metrics queries each: four
    // in-rollout windows plus the final pass.
    assert_eq!(az.count_matching("metrics list"), 20);
}

#[tokio::test]
async fn linear_rollout_restores_original_revision_mode() {
    let az = FakeAz::healthy(); // Starts in Single mode.
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 50, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    assert!(deployment.run().await.is_success());

    let mode_commands: Vec<String> = az
        .commands()
        .into_iter()
        .filter(|c| c.contains("revision set-mode"))
        .collect();
    assert_eq!(
        mode_commands,
        vec![
            "az containerapp revision set-mode -n shop -g prod-rg --mode multiple",
            "az containerapp revision set-mode -n shop -g prod-rg --mode single",
        ]
    );
}

#[tokio::test]
async fn canary_rollout_is_two_jumps() {
    let mut az = FakeAz::healthy();
    az.mode = "Multiple"; // No mode switching in this scenario.
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(true, 40, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    assert!(deployment.run().await.is_success());
    assert_eq!(az.traffic_set_args(), vec!["shop--v2=40", "shop--v2=100"]);
    assert_eq!(az.count_matching("revision set-mode"), 0);
    // Two windows: canary observation and the final pass.
    assert_eq!(az.count_matching("metrics list"), 8);
}

#[tokio::test]
async fn provisioning_failure_rolls_back_without_touching_traffic() {
    let mut az = FakeAz::healthy();
    az.provisioning_state = "Failed";
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 30, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    let outcome = deployment.run().await;
    match outcome {
        DeploymentOutcome::RolledBack { error } => {
            assert!(matches!(error, DeployError::Provisioning))
        }
        other => panic!("expected RolledBack, got {other:?}"),
    }
    assert_eq!(deployment.phase(), DeployPhase::RolledBack);

    // The new revision never received traffic; the only weight command
    // is the restore of the captured state.
    assert_eq!(az.traffic_set_args(), vec!["shop--v1=100 "]);
}

#[tokio::test]
async fn probe_failure_restores_captured_weights_verbatim() {
    let mut az = FakeAz::healthy();
    az.mode = "Multiple";
    az.traffic = r#"[
        { "revisionName": "rev-a", "weight": 70 },
        { "revisionName": "rev-b", "weight": 30 }
    ]"#;
    az.counts = [80.0, 0.0, 0.0, 20.0]; // 0.2 ratio against 0.1 threshold.
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 30, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    let outcome = deployment.run().await;
    assert!(matches!(
        outcome,
        DeploymentOutcome::RolledBack {
            error: DeployError::Probe(ProbeError::ErrorRate { .. })
        }
    ));

    // First shift went out, then the exact captured string came back.
    assert_eq!(
        az.traffic_set_args(),
        vec!["shop--v2=30", "rev-a=70 rev-b=30 "]
    );
    let last = az.commands().last().unwrap().clone();
    assert_eq!(
        last,
        "az containerapp ingress traffic set -n shop -g prod-rg \
         --revision-weight rev-a=70 rev-b=30 "
    );
}

#[tokio::test]
async fn failing_endpoint_probe_rolls_back() {
    let mut az = FakeAz::healthy();
    az.mode = "Multiple";
    let client = AzClient::new("shop", "prod-rg", &az);
    let mut p = params(false, 50, 100);
    p.endpoints = vec!["https://shop.example/health".to_string()];
    let mut deployment = Deployment::new(&p, &client, &FailingProber);

    let outcome = deployment.run().await;
    match outcome {
        DeploymentOutcome::RolledBack { error } => match error {
            DeployError::Probe(ProbeError::Endpoint { url, .. }) => {
                assert_eq!(url, "https://shop.example/health");
            }
            other => panic!("expected endpoint probe failure, got {other:?}"),
        },
        other => panic!("expected RolledBack, got {other:?}"),
    }
}

#[tokio::test]
async fn describe_failure_fails_without_rollback() {
    let mut az = FakeAz::healthy();
    az.fail_describe = true;
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 30, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    let outcome = deployment.run().await;
    match outcome {
        DeploymentOutcome::Failed {
            error,
            rollback_error,
        } => {
            assert!(matches!(error, DeployError::Command(_)));
            assert!(rollback_error.is_none());
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(deployment.phase(), DeployPhase::Failed);
    // Nothing was issued beyond the describe itself.
    assert_eq!(az.commands().len(), 1);
}

#[tokio::test]
async fn rollback_failure_is_terminal_with_state_dump() {
    let mut az = FakeAz::healthy();
    az.mode = "Multiple";
    az.fail_traffic_set = true; // Every weight command is rejected.
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 30, 100);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    let outcome = deployment.run().await;
    match outcome {
        DeploymentOutcome::Failed {
            error,
            rollback_error,
        } => {
            assert!(matches!(error, DeployError::Command(_)));
            assert!(rollback_error.is_some());
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(deployment.phase(), DeployPhase::Failed);

    // Restore was attempted exactly once, then the current state was
    // fetched for operator diagnosis.
    assert_eq!(az.traffic_set_args().len(), 2);
    assert_eq!(az.count_matching("containerapp show"), 2);
}

#[tokio::test]
async fn zero_final_pct_is_a_no_op_rollout() {
    let mut az = FakeAz::healthy();
    az.mode = "Multiple";
    let client = AzClient::new("shop", "prod-rg", &az);
    let p = params(false, 0, 0);
    let mut deployment = Deployment::new(&p, &client, &OkProber);

    assert!(deployment.run().await.is_success());
    // No traffic was ever shifted; only the final health pass ran.
    assert!(az.traffic_set_args().is_empty());
    assert_eq!(az.count_matching("metrics list"), 4);
}
