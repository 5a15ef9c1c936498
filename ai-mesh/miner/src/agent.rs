use std::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use nimbus_attestation::{AttestationMode, GpuAttestation, SoftwareAttestation};
use nimbus_types::{DeviceId, Hash32};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MinerConfig;

#[derive(Debug, Serialize)]
struct RegisterPayload {
    id: String,
    wallet_address: String,
    endpoint: String,
    gpus: Vec<String>,
    tier: String,
    stake_lux: u128,
    gpu_attestation: GpuAttestation,
}

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Builds a software-attested GPU claim for hardware with no local SPDM
/// report available to this agent. A real deployment on CC-capable hardware
/// would populate `local` instead and likely present a higher tier.
fn software_attestation(config: &MinerConfig) -> GpuAttestation {
    GpuAttestation {
        device_id: DeviceId::new(format!("{}-gpu0", config.wallet)),
        model: config.gpu_model.clone(),
        cc_enabled: false,
        tee_io_enabled: false,
        driver_version: "unknown".to_string(),
        vbios_version: "unknown".to_string(),
        mode: Some(AttestationMode::Software),
        local: None,
        software: Some(SoftwareAttestation {
            gpu_serial: format!("{}-serial", config.wallet),
            pci_id: "0000:01:00.0".to_string(),
            driver_version: "unknown".to_string(),
            compute_caps: "8.9".to_string(),
            benchmark_hash: Hash32::digest(config.wallet.as_bytes()),
            benchmark_time_ms: 1,
            provider_pubkey: vec![0u8; 32],
            signature: vec![0u8; 64],
            timestamp: now_unix(),
            nonce: vec![],
        }),
    }
}

#[derive(Debug, Deserialize)]
struct PendingTask {
    id: String,
    #[allow(dead_code)]
    model: String,
}

/// Polls a `nimbus-node` instance for pending work and completes it. Carries
/// no inference kernel: `execute` is an opaque passthrough that echoes a
/// fixed-size canned response, since running a model is out of scope here.
pub struct MinerAgent {
    config: MinerConfig,
    client: reqwest::Client,
}

impl MinerAgent {
    pub fn new(config: MinerConfig) -> Self {
        MinerAgent {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn register(&self) -> Result<()> {
        let payload = RegisterPayload {
            id: self.config.wallet.clone(),
            wallet_address: self.config.wallet.clone(),
            endpoint: format!("http://127.0.0.1:{}", self.config.port),
            gpus: vec![self.config.gpu_model.clone()],
            tier: "Tier4".to_string(),
            stake_lux: 1_000,
            gpu_attestation: software_attestation(&self.config),
        };
        let url = format!("{}/api/miners/register", self.config.node_url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("failed to reach node at {url}"))?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "registration rejected by node");
        } else {
            info!(wallet = %self.config.wallet, "registered with node");
        }
        Ok(())
    }

    /// Fetches pending tasks, executes each, and submits the result. Returns
    /// the number of tasks completed this poll.
    pub async fn poll_once(&self) -> Result<usize> {
        let url = format!("{}/api/tasks/pending", self.config.node_url);
        let tasks: Vec<PendingTask> = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach node at {url}"))?
            .json()
            .await
            .context("failed to parse pending tasks response")?;

        let mut completed = 0;
        for task in tasks {
            if self.execute_and_submit(&task.id).await.is_ok() {
                completed += 1;
            }
        }
        Ok(completed)
    }

    async fn execute_and_submit(&self, task_id: &str) -> Result<()> {
        let output = self.execute();
        let body = serde_json::json!({
            "task_id": task_id,
            "provider_id": self.config.wallet,
            "output": output,
            "compute_time_ms": 250,
            "proof": Vec::<u8>::new(),
        });
        let url = format!("{}/api/tasks/submit", self.config.node_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach node at {url}"))?;
        if !response.status().is_success() {
            warn!(task_id, status = %response.status(), "task submission rejected");
        }
        Ok(())
    }

    /// Canned passthrough response; no model runs here.
    fn execute(&self) -> Vec<u8> {
        vec![0u8; 64]
    }

    /// Runs the register-then-poll loop forever at `interval`.
    pub async fn run(&self, interval: Duration) -> Result<()> {
        self.register().await?;
        loop {
            match self.poll_once().await {
                Ok(n) if n > 0 => info!(completed = n, "poll cycle completed tasks"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "poll cycle failed"),
            }
            tokio::time::sleep(interval).await;
        }
    }
}
