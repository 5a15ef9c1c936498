use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tier::CCTier;

/// Default component weights; must sum to 1.0 within 0.01.
pub const WEIGHT_HARDWARE: f64 = 0.40;
pub const WEIGHT_ATTESTATION: f64 = 0.30;
pub const WEIGHT_REPUTATION: f64 = 0.20;
pub const WEIGHT_UPTIME: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationMethod {
    Nvtrust,
    SevSnp,
    Tdx,
    Cca,
    SecureEnclave,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct HardwareInputs {
    pub tier: CCTier,
    pub gpu_generation: f64,
    pub cc_features_enabled: bool,
    pub tee_io_enabled: bool,
    pub rim_verified: bool,
    pub mig_supported: bool,
    pub gpu_memory_mb: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct AttestationInputs {
    pub age_secs: u64,
    pub validity_secs: u64,
    pub method: AttestationMethod,
    pub local_verification: bool,
    pub cert_chain_valid: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ReputationInputs {
    pub completed: u64,
    pub failed: u64,
    pub slashing_events: u32,
    /// Normalized historical reputation in [0, 1].
    pub historical_reputation: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct UptimeInputs {
    /// Percentage in [0, 100].
    pub uptime_percentage: f64,
    pub last_heartbeat_secs_ago: u64,
    pub consecutive_heartbeats: u64,
}

pub fn hardware_score(inputs: &HardwareInputs) -> f64 {
    let base = match inputs.tier {
        CCTier::Tier1 => (35.0 + 0.5 * inputs.gpu_generation).min(40.0),
        CCTier::Tier2 => (25.0 + 0.5 * inputs.gpu_generation).min(30.0),
        CCTier::Tier3 => (15.0 + 0.5 * inputs.gpu_generation).min(20.0),
        CCTier::Tier4 | CCTier::Unknown => 5.0,
    };
    let mut score = base;
    if inputs.cc_features_enabled {
        score += 3.0;
    }
    if inputs.tee_io_enabled {
        score += 2.0;
    }
    if inputs.rim_verified {
        score += 2.0;
    }
    if inputs.mig_supported {
        score += 1.0;
    }
    if inputs.gpu_memory_mb > 80_000 {
        score += 2.0;
    }
    score.clamp(0.0, 100.0)
}

pub fn attestation_score(inputs: &AttestationInputs) -> f64 {
    let mut score: f64 = 70.0;
    if inputs.validity_secs > 0 {
        let ratio = inputs.age_secs as f64 / inputs.validity_secs as f64;
        score += if ratio < 0.25 {
            15.0
        } else if ratio < 0.50 {
            10.0
        } else if ratio < 0.75 {
            5.0
        } else {
            0.0
        };
    }
    score += match inputs.method {
        AttestationMethod::Nvtrust => 10.0,
        AttestationMethod::SevSnp | AttestationMethod::Tdx => 8.0,
        AttestationMethod::Cca => 6.0,
        AttestationMethod::SecureEnclave => 5.0,
        AttestationMethod::Other => 2.0,
    };
    if inputs.local_verification {
        score += 5.0;
    }
    if inputs.cert_chain_valid {
        score += 3.0;
    }
    score.clamp(0.0, 100.0)
}

pub fn reputation_score(inputs: &ReputationInputs) -> f64 {
    let mut score = 50.0;
    if inputs.completed > 0 {
        let success_rate = inputs.completed as f64 / (inputs.completed + inputs.failed) as f64;
        score += success_rate * 30.0;
    }
    let volume = inputs.completed + inputs.failed;
    score += if volume > 1000 {
        5.0
    } else if volume > 100 {
        3.0
    } else if volume > 10 {
        1.0
    } else {
        0.0
    };
    score -= (10.0 * inputs.slashing_events as f64).min(30.0);
    score += inputs.historical_reputation * 15.0;
    score.clamp(0.0, 100.0)
}

pub fn uptime_score(inputs: &UptimeInputs) -> f64 {
    let mut score = inputs.uptime_percentage * 0.7;
    score += if inputs.last_heartbeat_secs_ago < 60 {
        15.0
    } else if inputs.last_heartbeat_secs_ago < 300 {
        12.0
    } else if inputs.last_heartbeat_secs_ago < 900 {
        8.0
    } else if inputs.last_heartbeat_secs_ago < 3600 {
        4.0
    } else {
        0.0
    };
    score += if inputs.consecutive_heartbeats > 1000 {
        15.0
    } else if inputs.consecutive_heartbeats > 100 {
        10.0
    } else if inputs.consecutive_heartbeats > 10 {
        5.0
    } else {
        0.0
    };
    score.min(100.0)
}

/// Computes the weighted total and clamps it to the tier's
/// [BaseTrustScore, MaxTrustScore] window. Clamping to the minimum logs a
/// warning, matching the "score clamped to tier minimum" requirement.
pub fn weighted_trust_score(
    tier: CCTier,
    hardware: &HardwareInputs,
    attestation: &AttestationInputs,
    reputation: &ReputationInputs,
    uptime: &UptimeInputs,
) -> f64 {
    let total = hardware_score(hardware) * WEIGHT_HARDWARE
        + attestation_score(attestation) * WEIGHT_ATTESTATION
        + reputation_score(reputation) * WEIGHT_REPUTATION
        + uptime_score(uptime) * WEIGHT_UPTIME;

    let Some(params) = tier.params() else {
        return total.clamp(0.0, 100.0);
    };

    if total < params.base_trust_score {
        warn!(
            ?tier,
            total, base = params.base_trust_score, "score clamped to tier minimum"
        );
        params.base_trust_score
    } else {
        total.min(params.max_trust_score)
    }
}

/// `AdjustScoreForSlashing(score, severity) = max(1, score - floor(score*severity))`.
/// Never returns 0.
pub fn adjust_score_for_slashing(score: f64, severity: f64) -> f64 {
    let penalty = (score * severity).floor();
    (score - penalty).max(1.0)
}

/// `RecoverScoreAfterGoodBehavior(score, max, rate) = min(max, score + floor((max-score)*rate))`.
pub fn recover_score_after_good_behavior(score: f64, max: f64, rate: f64) -> f64 {
    let gain = ((max - score) * rate).floor();
    (score + gain).min(max)
}
