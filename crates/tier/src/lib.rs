// ============================================================================
// NIMBUS TIER - Confidential-Compute Classifier & Trust Scorer
// ============================================================================
// PURPOSE: Maps a provider's hardware capability plus verifier output to a
// CCTier (C4 classifier) and a four-component weighted trust score, with
// slashing/recovery adjustments.
// ============================================================================

pub mod classifier;
pub mod scorer;
pub mod tier;

pub use classifier::{can_achieve_tier, get_supported_tiers, max_tier};
pub use scorer::{
    adjust_score_for_slashing, attestation_score, hardware_score, recover_score_after_good_behavior,
    reputation_score, uptime_score, weighted_trust_score, AttestationInputs, AttestationMethod,
    HardwareInputs, ReputationInputs, UptimeInputs,
};
pub use tier::{meets_tier_requirement, CCTier, TierParams, TIER_TABLE};
