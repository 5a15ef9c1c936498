use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use nimbus_tier::CCTier;
use nimbus_types::ProviderId;

/// Task compute-intensity level, used as a reward multiplier alongside the
/// provider's tier multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelingLevel {
    Light,
    Standard,
    Heavy,
    Training,
    Specialized,
}

impl ModelingLevel {
    /// Multiplier expressed as basis points (x100) to keep the per-receipt
    /// reward formula in integer arithmetic.
    fn multiplier_bp(&self) -> u64 {
        match self {
            ModelingLevel::Light => 50,
            ModelingLevel::Standard => 100,
            ModelingLevel::Heavy => 150,
            ModelingLevel::Training => 200,
            ModelingLevel::Specialized => 250,
        }
    }
}

fn tier_multiplier_bp(tier: CCTier) -> u64 {
    match tier {
        CCTier::Tier1 => 150,
        CCTier::Tier2 => 100,
        CCTier::Tier3 => 75,
        CCTier::Tier4 | CCTier::Unknown => 50,
    }
}

/// Per-receipt reward = baseRatePerComputeUnit * ComputeTime *
/// tierRewardMultiplier(providerTier) * modelingLevelMultiplier(taskLevel),
/// computed entirely in integer wei via basis-point multipliers so no
/// fractional wei is ever dropped by a floating-point multiply.
pub fn per_receipt_reward(
    base_rate_wei_per_ms: u128,
    compute_time_ms: u64,
    tier: CCTier,
    level: ModelingLevel,
) -> BigUint {
    let base = BigUint::from(base_rate_wei_per_ms) * BigUint::from(compute_time_ms);
    let tier_bp = tier_multiplier_bp(tier);
    let level_bp = level.multiplier_bp();
    base * tier_bp * level_bp / BigUint::from(100u32 * 100u32)
}

/// `CalculateBlockRewardSplit(totalBlock) -> (validator = totalBlock*90/100,
/// aiPool = totalBlock - validator)`. Exact: validator + aiPool always sums
/// back to totalBlock, no wei lost to rounding.
pub fn calculate_block_reward_split(total_block: &BigUint) -> (BigUint, BigUint) {
    let validator = total_block * 90u32 / 100u32;
    let ai_pool = total_block - &validator;
    (validator, ai_pool)
}

/// Per-provider inputs to the participation-reward weighting formula.
#[derive(Debug, Clone)]
pub struct ParticipationInput {
    pub provider_id: ProviderId,
    pub tier: CCTier,
    /// Hook for a per-model bonus multiplier; defaults to 1.0 when the
    /// caller has no model-specific adjustment to apply.
    pub model_multiplier: f64,
    pub stake_lux: u128,
    pub consecutive_epochs: u64,
    /// Normalized reputation score in [0, 1].
    pub reputation_score: f64,
}

fn participation_weight(input: &ParticipationInput) -> f64 {
    let tier_mult = tier_multiplier_bp(input.tier) as f64 / 100.0;
    let stake_weight = if input.stake_lux <= 1000 {
        1.0
    } else {
        (10.0_f64).min(((input.stake_lux as f64) / 1000.0).sqrt())
    };
    let uptime_bonus = 1.0 + (0.5_f64).min(input.consecutive_epochs as f64 / 1000.0);
    let reputation_bonus = 0.8 + input.reputation_score * 0.4;
    tier_mult * input.model_multiplier * stake_weight * uptime_bonus * reputation_bonus
}

/// `CalculateParticipationRewards`: distributes `pool * participation_share`
/// among `providers` in proportion to their weight. An empty provider set or
/// a zero weight sum yields no rewards this epoch.
pub fn calculate_participation_rewards(
    pool: &BigUint,
    participation_share: f64,
    providers: &[ParticipationInput],
) -> HashMap<ProviderId, BigUint> {
    if providers.is_empty() {
        return HashMap::new();
    }
    let weights: Vec<f64> = providers.iter().map(participation_weight).collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return HashMap::new();
    }

    // Scale the participation share to parts-per-billion so the share
    // itself never needs floating point once applied to the integer pool.
    const PPB: u64 = 1_000_000_000;
    let share_ppb = (participation_share * PPB as f64).round() as u64;
    let participation_pool = pool * share_ppb / PPB;

    let mut out = HashMap::new();
    for (input, weight) in providers.iter().zip(weights.iter()) {
        let weight_ppb = ((weight / total_weight) * PPB as f64).round() as u64;
        let amount = &participation_pool * weight_ppb / PPB;
        if !amount.is_zero() {
            out.insert(input.provider_id.clone(), amount);
        }
    }
    out
}
