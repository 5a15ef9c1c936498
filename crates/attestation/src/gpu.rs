use nimbus_types::{DeviceId, Hash32};
use serde::{Deserialize, Serialize};

/// GPU attestation mode. `Local` covers CC-capable hardware with a local
/// SPDM report; `Software` covers everything else via a signed benchmark
/// attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationMode {
    Local,
    Software,
}

/// SPDM-backed local attestation evidence for CC-capable GPUs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalEvidence {
    pub spdm_report: Vec<u8>,
    pub cert_chain: Vec<u8>,
    pub rim_verified: bool,
    pub driver_report: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Signed benchmark-based attestation for GPUs with no CC hardware support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareAttestation {
    pub gpu_serial: String,
    pub pci_id: String,
    pub driver_version: String,
    pub compute_caps: String,
    pub benchmark_hash: Hash32,
    pub benchmark_time_ms: u64,
    pub provider_pubkey: Vec<u8>,
    pub signature: Vec<u8>,
    pub timestamp: u64,
    pub nonce: Vec<u8>,
}

/// A provider's claimed GPU attestation. Exactly one of `local` or
/// `software` must be present and must match `mode` (when `mode` is set);
/// anything else is an invalid quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuAttestation {
    pub device_id: DeviceId,
    pub model: String,
    pub cc_enabled: bool,
    pub tee_io_enabled: bool,
    pub driver_version: String,
    pub vbios_version: String,
    pub mode: Option<AttestationMode>,
    pub local: Option<LocalEvidence>,
    pub software: Option<SoftwareAttestation>,
}

impl GpuAttestation {
    /// Resolves the effective mode: explicit `mode` wins, otherwise infer
    /// from whichever evidence payload is present.
    pub fn effective_mode(&self) -> Option<AttestationMode> {
        if let Some(mode) = self.mode {
            return Some(mode);
        }
        if self.local.is_some() {
            return Some(AttestationMode::Local);
        }
        if self.software.is_some() {
            return Some(AttestationMode::Software);
        }
        None
    }
}

/// Verifier-owned record of a device's attestation state. Mutated only on a
/// successful verify or on `RecordJobCompletion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub attested: bool,
    pub trust_score: f64,
    pub last_seen: u64,
    pub operator: String,
    pub vendor: String,
    /// Ordered, append-only sequence of completed job IDs.
    pub job_history: Vec<String>,
    pub mode: AttestationMode,
    pub hardware_cc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_id() -> DeviceId {
        DeviceId::new("GPU-001")
    }

    #[test]
    fn effective_mode_prefers_explicit_mode() {
        let att = GpuAttestation {
            device_id: device_id(),
            model: "H100".into(),
            cc_enabled: true,
            tee_io_enabled: false,
            driver_version: "1".into(),
            vbios_version: "1".into(),
            mode: Some(AttestationMode::Software),
            local: Some(LocalEvidence {
                spdm_report: vec![],
                cert_chain: vec![],
                rim_verified: false,
                driver_report: vec![],
                nonce: vec![],
            }),
            software: None,
        };
        assert_eq!(att.effective_mode(), Some(AttestationMode::Software));
    }

    #[test]
    fn effective_mode_infers_from_payload_when_unset() {
        let att = GpuAttestation {
            device_id: device_id(),
            model: "H100".into(),
            cc_enabled: true,
            tee_io_enabled: false,
            driver_version: "1".into(),
            vbios_version: "1".into(),
            mode: None,
            local: Some(LocalEvidence {
                spdm_report: vec![],
                cert_chain: vec![],
                rim_verified: false,
                driver_report: vec![],
                nonce: vec![],
            }),
            software: None,
        };
        assert_eq!(att.effective_mode(), Some(AttestationMode::Local));
    }
}
