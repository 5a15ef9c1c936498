use serde::{Deserialize, Serialize};

/// Immutable facts about a host, supplied by the external hardware-capability
/// collector. The core never shells out to nvidia-smi/NVML itself; it only
/// consumes this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub gpu_vendor: String,
    pub gpu_model: String,
    pub cc_enabled: bool,
    pub tee_io_enabled: bool,
    pub cpu_tee_kind: CpuTeeKind,
    pub cpu_tee_active: bool,
    pub device_tee_enabled: bool,
    pub nvtrust_available: bool,
    pub gpu_memory_mb: u64,
    pub mig_supported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuTeeKind {
    SevSnp,
    Tdx,
    Cca,
    None,
}

/// Row of the closed capability table (§6). `compute_cap` is informational
/// only; nothing in the core branches on its exact value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuModelFacts {
    pub cc_capable: bool,
    pub tee_io: bool,
    pub mig: bool,
    pub compute_cap: f32,
}

/// `IsHardwareCCCapable(model)` treated as a pure function over a closed
/// model set. Every model not explicitly listed (including DGX Spark/GB10
/// and consumer RTX cards) is not CC-capable and must fall back to Software
/// attestation.
pub fn model_facts(model: &str) -> GpuModelFacts {
    match model {
        "B100" | "B200" | "GB200" => GpuModelFacts {
            cc_capable: true,
            tee_io: true,
            mig: true,
            compute_cap: 9.0,
        },
        "H100" | "H200" => GpuModelFacts {
            cc_capable: true,
            tee_io: false,
            mig: true,
            compute_cap: 9.0,
        },
        "RTX PRO 6000" => GpuModelFacts {
            cc_capable: true,
            tee_io: true,
            mig: false,
            compute_cap: 9.0,
        },
        "RTX 6000 Ada" => GpuModelFacts {
            cc_capable: true,
            tee_io: false,
            mig: false,
            compute_cap: 8.9,
        },
        "GH200" => GpuModelFacts {
            cc_capable: true,
            tee_io: false,
            mig: true,
            compute_cap: 9.0,
        },
        _ => GpuModelFacts {
            cc_capable: false,
            tee_io: false,
            mig: false,
            compute_cap: 0.0,
        },
    }
}

pub fn is_hardware_cc_capable(model: &str) -> bool {
    model_facts(model).cc_capable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cc_capable_models_are_recognized() {
        for m in ["H100", "H200", "B100", "B200", "GB200", "RTX PRO 6000"] {
            assert!(is_hardware_cc_capable(m), "{m} should be CC-capable");
        }
    }

    #[test]
    fn non_cc_models_fall_back() {
        for m in ["RTX 5090", "RTX 4090", "GB10", "made-up-model"] {
            assert!(!is_hardware_cc_capable(m), "{m} should not be CC-capable");
        }
    }

    #[test]
    fn unknown_model_is_safe_default() {
        let facts = model_facts("totally-unknown");
        assert!(!facts.cc_capable);
        assert!(!facts.tee_io);
        assert!(!facts.mig);
    }
}
