use serde::{Deserialize, Serialize};

/// One of four confidential-compute trust levels, 1 highest. `Unknown` is the
/// safe default for a capability that doesn't match any classification rule;
/// it never satisfies a tier requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CCTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Unknown,
}

impl CCTier {
    /// Numeric level, lower is better. `None` for `Unknown`.
    pub fn level(&self) -> Option<u8> {
        match self {
            CCTier::Tier1 => Some(1),
            CCTier::Tier2 => Some(2),
            CCTier::Tier3 => Some(3),
            CCTier::Tier4 => Some(4),
            CCTier::Unknown => None,
        }
    }

    pub fn from_level(level: u8) -> CCTier {
        match level {
            1 => CCTier::Tier1,
            2 => CCTier::Tier2,
            3 => CCTier::Tier3,
            4 => CCTier::Tier4,
            _ => CCTier::Unknown,
        }
    }

    pub fn params(&self) -> Option<TierParams> {
        TIER_TABLE.iter().find(|p| p.tier == *self).copied()
    }
}

/// Fixed parameters for a tier (§6 "Tier parameters" table). Invariant:
/// `base_trust_score <= max_trust_score`; validity windows strictly grow
/// from tier 1 to tier 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierParams {
    pub tier: CCTier,
    pub base_trust_score: f64,
    pub max_trust_score: f64,
    pub min_stake_lux: u128,
    pub reward_multiplier: f64,
    pub attestation_validity_secs: u64,
}

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

pub static TIER_TABLE: [TierParams; 4] = [
    TierParams {
        tier: CCTier::Tier1,
        base_trust_score: 90.0,
        max_trust_score: 100.0,
        min_stake_lux: 100_000,
        reward_multiplier: 1.5,
        attestation_validity_secs: 6 * HOUR,
    },
    TierParams {
        tier: CCTier::Tier2,
        base_trust_score: 70.0,
        max_trust_score: 89.0,
        min_stake_lux: 50_000,
        reward_multiplier: 1.0,
        attestation_validity_secs: DAY,
    },
    TierParams {
        tier: CCTier::Tier3,
        base_trust_score: 50.0,
        max_trust_score: 69.0,
        min_stake_lux: 10_000,
        reward_multiplier: 0.75,
        attestation_validity_secs: 7 * DAY,
    },
    TierParams {
        tier: CCTier::Tier4,
        base_trust_score: 10.0,
        max_trust_score: 49.0,
        min_stake_lux: 1_000,
        reward_multiplier: 0.5,
        attestation_validity_secs: 30 * DAY,
    },
];

/// `MeetsRequirement(have, need) <=> have != Unknown && have <= need` where
/// tier ordering is by numeric level (1 is the most trusted, so a tier-1
/// provider satisfies any requirement up to tier 4).
pub fn meets_tier_requirement(have: CCTier, need: CCTier) -> bool {
    match (have.level(), need.level()) {
        (Some(h), Some(n)) => h <= n,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_never_exceeds_max() {
        for params in TIER_TABLE.iter() {
            assert!(params.base_trust_score <= params.max_trust_score);
        }
    }

    #[test]
    fn validity_windows_grow_with_tier() {
        let windows: Vec<u64> = TIER_TABLE.iter().map(|p| p.attestation_validity_secs).collect();
        for pair in windows.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn meets_requirement_is_reflexive() {
        for tier in [CCTier::Tier1, CCTier::Tier2, CCTier::Tier3, CCTier::Tier4] {
            assert!(meets_tier_requirement(tier, tier));
        }
    }

    #[test]
    fn meets_requirement_is_monotone() {
        assert!(meets_tier_requirement(CCTier::Tier1, CCTier::Tier4));
        assert!(!meets_tier_requirement(CCTier::Tier4, CCTier::Tier1));
    }

    #[test]
    fn unknown_never_meets_any_requirement() {
        assert!(!meets_tier_requirement(CCTier::Unknown, CCTier::Tier4));
        assert!(!meets_tier_requirement(CCTier::Tier1, CCTier::Unknown));
    }
}
