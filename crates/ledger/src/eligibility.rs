use nimbus_tier::CCTier;

/// Inputs needed to decide `RandomMiningEligibility`: a provider is eligible
/// when it is online, has presented an attestation, that attestation is
/// still valid, and its stake meets the tier minimum.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInputs {
    pub online: bool,
    pub attestation_present: bool,
    pub attestation_valid: bool,
    pub stake_lux: u128,
    pub tier: CCTier,
}

pub fn is_eligible_for_mining(inputs: &EligibilityInputs) -> bool {
    if !inputs.online || !inputs.attestation_present || !inputs.attestation_valid {
        return false;
    }
    match inputs.tier.params() {
        Some(params) => inputs.stake_lux >= params.min_stake_lux,
        None => false,
    }
}
