use nimbus_attestation::{AttestationQuote, GpuAttestation};
use nimbus_tier::CCTier;
use nimbus_types::ProviderId;

use crate::ewma::Ewma;

/// Default EWMA smoothing factor for uptime and latency tracking.
pub const DEFAULT_EWMA_ALPHA: f64 = 0.9;

/// Default concurrency cap for a provider with no declared GPUs.
pub const DEFAULT_MAX_TASKS: u32 = 10;

/// A provider that racks up this many failures without an intervening
/// heartbeat is taken offline until it heartbeats again.
pub const MAX_FAILURES_BEFORE_OFFLINE: u32 = 3;

#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub online: bool,
    pub last_seen: u64,
    uptime: Ewma,
    latency_ms: Ewma,
    pub failure_count: u32,
    pub current_tasks: u32,
    pub max_tasks: u32,
}

impl ProviderStatus {
    pub fn new(max_tasks: u32, now: u64) -> Self {
        ProviderStatus {
            online: true,
            last_seen: now,
            uptime: Ewma::new(DEFAULT_EWMA_ALPHA),
            latency_ms: Ewma::new(DEFAULT_EWMA_ALPHA),
            failure_count: 0,
            current_tasks: 0,
            max_tasks,
        }
    }

    pub fn record_heartbeat(&mut self, now: u64) {
        self.last_seen = now;
        self.uptime.update(100.0);
        self.online = true;
        self.failure_count = 0;
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.uptime.update(0.0);
        if self.failure_count >= MAX_FAILURES_BEFORE_OFFLINE {
            self.online = false;
        }
    }

    pub fn record_latency(&mut self, latency_ms: f64) {
        self.latency_ms.update(latency_ms);
    }

    pub fn uptime_percentage(&self) -> f64 {
        if self.uptime.initialized() {
            self.uptime.value()
        } else {
            100.0
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        self.latency_ms.value()
    }

    pub fn failure_rate(&self) -> f64 {
        if self.current_tasks == 0 && self.failure_count == 0 {
            0.0
        } else {
            self.failure_count as f64 / (self.failure_count as f64 + self.current_tasks as f64 + 1.0)
        }
    }

    /// `Online <=> now - LastSeen < MaxHeartbeatAge`.
    pub fn is_online(&self, now: u64, max_heartbeat_age_secs: u64) -> bool {
        self.online && now.saturating_sub(self.last_seen) < max_heartbeat_age_secs
    }
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub id: ProviderId,
    pub wallet_address: String,
    pub endpoint: String,
    pub gpus: Vec<String>,
    pub cpu_attestation: Option<AttestationQuote>,
    pub gpu_attestation: Option<GpuAttestation>,
    pub status: ProviderStatus,
    pub reputation: f64,
    pub tasks_handled: u64,
    pub joined_at: u64,
    pub tier: CCTier,
    pub stake_lux: u128,
    pub slashed: bool,
}

impl Provider {
    pub fn new(
        id: ProviderId,
        wallet_address: String,
        endpoint: String,
        gpus: Vec<String>,
        tier: CCTier,
        stake_lux: u128,
        now: u64,
    ) -> Self {
        let max_tasks = if gpus.is_empty() {
            DEFAULT_MAX_TASKS
        } else {
            2 * gpus.len() as u32
        };
        Provider {
            id,
            wallet_address,
            endpoint,
            gpus,
            cpu_attestation: None,
            gpu_attestation: None,
            status: ProviderStatus::new(max_tasks, now),
            reputation: 50.0,
            tasks_handled: 0,
            joined_at: now,
            tier,
            stake_lux,
            slashed: false,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.status.current_tasks < self.status.max_tasks
    }
}
