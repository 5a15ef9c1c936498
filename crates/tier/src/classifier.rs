use nimbus_attestation::capability::{is_hardware_cc_capable, Capability, CpuTeeKind};

use crate::tier::CCTier;

/// `MaxTier(capability)` applies first-match priority over the capability
/// record: GPU-native CC beats CPU TEE beats device TEE beats the
/// stake-only floor.
pub fn max_tier(capability: &Capability) -> CCTier {
    if is_hardware_cc_capable(&capability.gpu_model)
        && capability.cc_enabled
        && capability.nvtrust_available
    {
        return CCTier::Tier1;
    }
    if matches!(
        capability.cpu_tee_kind,
        CpuTeeKind::SevSnp | CpuTeeKind::Tdx | CpuTeeKind::Cca
    ) && capability.cpu_tee_active
    {
        return CCTier::Tier2;
    }
    if capability.device_tee_enabled {
        return CCTier::Tier3;
    }
    CCTier::Tier4
}

/// Returns every tier from `max` down to Tier4 inclusive: everything the
/// capability can satisfy, from its best achievable tier to the floor.
pub fn get_supported_tiers(max: CCTier) -> Vec<CCTier> {
    let Some(start) = max.level() else {
        return Vec::new();
    };
    (start..=4).map(CCTier::from_level).collect()
}

pub fn can_achieve_tier(max: CCTier, target: CCTier) -> bool {
    match (max.level(), target.level()) {
        (Some(m), Some(t)) => m <= t,
        _ => false,
    }
}
