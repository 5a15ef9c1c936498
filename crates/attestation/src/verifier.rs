use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use nimbus_metrics::ATTESTATION_METRICS;
use nimbus_types::{CoreError, DeviceId};
use tracing::warn;

use crate::capability::model_facts;
use crate::gpu::{AttestationMode, DeviceStatus, GpuAttestation};
use crate::parsers::{sevsnp, sgx, spdm, tdx};
use crate::quote::{AttestationQuote, TeeKind, QUOTE_MAX_AGE_SECS};

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Verifies CPU and GPU attestation evidence (C3). The trusted-measurement
/// map is written once at boot then read-only during operation; the device
/// table is the only mutable state and is protected by its own mutex, kept
/// separate from the scheduler's and ledger's locks per the lock-ordering
/// contract (Scheduler -> Verifier -> Ledger).
#[derive(Debug)]
pub struct Verifier {
    trusted_measurements: HashMap<String, Vec<u8>>,
    devices: Mutex<HashMap<DeviceId, DeviceStatus>>,
}

impl Verifier {
    pub fn new() -> Self {
        Verifier {
            trusted_measurements: HashMap::new(),
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a golden measurement keyed by name. Intended to be called only
    /// during boot, before any verification traffic arrives.
    pub fn register_trusted_measurement(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.trusted_measurements.insert(name.into(), bytes);
    }

    pub fn trusted_measurement(&self, name: &str) -> Option<&[u8]> {
        self.trusted_measurements.get(name).map(|v| v.as_slice())
    }

    pub fn device_status(&self, device_id: &DeviceId) -> Option<DeviceStatus> {
        self.devices.lock().unwrap().get(device_id).cloned()
    }

    /// Verifies a CPU attestation quote. Never validates the cryptographic
    /// signature chain itself; that is a named hook an implementation can
    /// plug in without changing this interface.
    pub fn verify_cpu_attestation(
        &self,
        quote: &AttestationQuote,
        expected_measurement: Option<&[u8]>,
    ) -> Result<(), CoreError> {
        let result = self.verify_cpu_attestation_inner(quote, expected_measurement);
        match &result {
            Ok(()) => ATTESTATION_METRICS.quotes_verified.inc(),
            Err(_) => ATTESTATION_METRICS.quotes_rejected.inc(),
        }
        result
    }

    fn verify_cpu_attestation_inner(
        &self,
        quote: &AttestationQuote,
        expected_measurement: Option<&[u8]>,
    ) -> Result<(), CoreError> {
        if quote.quote.is_empty() {
            return Err(CoreError::InvalidQuote("empty quote".into()));
        }
        let now = now_unix();
        if quote.is_expired(now) {
            return Err(CoreError::QuoteExpired {
                issued_at: quote.timestamp,
                now,
                max_age_secs: QUOTE_MAX_AGE_SECS,
            });
        }
        match quote.kind {
            TeeKind::Sgx => {
                let mrenclave = sgx::parse_mrenclave(&quote.quote)?;
                if let Some(expected) = expected_measurement {
                    if mrenclave.as_slice() != expected {
                        return Err(CoreError::InvalidMeasurement {
                            expected: hex::encode(expected),
                            actual: hex::encode(mrenclave),
                        });
                    }
                }
                Ok(())
            }
            TeeKind::SevSnp => {
                let report = sevsnp::parse(&quote.quote)?;
                if let Some(expected) = expected_measurement {
                    if report.measurement.as_slice() != expected {
                        return Err(CoreError::InvalidMeasurement {
                            expected: hex::encode(expected),
                            actual: hex::encode(report.measurement),
                        });
                    }
                }
                Ok(())
            }
            TeeKind::Tdx => {
                let parsed = tdx::parse(&quote.quote)?;
                if let Some(expected) = expected_measurement {
                    if parsed.report_data.as_slice() != expected {
                        return Err(CoreError::InvalidMeasurement {
                            expected: hex::encode(expected),
                            actual: hex::encode(parsed.report_data),
                        });
                    }
                }
                Ok(())
            }
            TeeKind::Nvidia | TeeKind::ArmCca | TeeKind::Unknown => {
                Err(CoreError::UnsupportedTEE(format!("{:?}", quote.kind)))
            }
        }
    }

    /// Verifies a GPU attestation and, on success, records the resulting
    /// `DeviceStatus` keyed by `DeviceID`.
    pub fn verify_gpu_attestation(
        &self,
        att: &GpuAttestation,
    ) -> Result<DeviceStatus, CoreError> {
        let result = self.verify_gpu_attestation_inner(att);
        match &result {
            Ok(status) => {
                ATTESTATION_METRICS.quotes_verified.inc();
                ATTESTATION_METRICS.trust_score.observe(status.trust_score);
            }
            Err(_) => ATTESTATION_METRICS.quotes_rejected.inc(),
        }
        result
    }

    fn verify_gpu_attestation_inner(&self, att: &GpuAttestation) -> Result<DeviceStatus, CoreError> {
        let mode = att.effective_mode();
        let status = match mode {
            Some(AttestationMode::Local) => self.verify_local(att)?,
            Some(AttestationMode::Software) => self.verify_software(att)?,
            None => {
                return Err(CoreError::InvalidQuote(
                    "no local or software evidence present".into(),
                ))
            }
        };
        self.devices
            .lock()
            .unwrap()
            .insert(att.device_id.clone(), status.clone());
        Ok(status)
    }

    fn verify_local(&self, att: &GpuAttestation) -> Result<DeviceStatus, CoreError> {
        let facts = model_facts(&att.model);
        if !facts.cc_capable {
            return Err(CoreError::HardwareNotSupported(
                "GPU model does not support confidential computing".into(),
            ));
        }
        let local = att.local.as_ref().ok_or_else(|| {
            CoreError::InvalidQuote("mode is Local but no local evidence present".into())
        })?;
        spdm::check_lengths(&local.spdm_report, &local.cert_chain)?;

        let mut score = 70.0_f64;
        if att.cc_enabled {
            score += 15.0;
        }
        if att.tee_io_enabled {
            score += 5.0;
        }
        if local.rim_verified {
            score += 5.0;
        }
        score += match att.model.as_str() {
            "GB200" | "B200" | "B100" => 10.0,
            "H200" | "H100" => 8.0,
            "RTX PRO 6000" => 5.0,
            _ => 0.0,
        };
        score = score.clamp(0.0, 100.0);

        Ok(DeviceStatus {
            attested: true,
            trust_score: score,
            last_seen: now_unix(),
            operator: String::new(),
            vendor: "NVIDIA".into(),
            job_history: Vec::new(),
            mode: AttestationMode::Local,
            hardware_cc: local.rim_verified,
        })
    }

    fn verify_software(&self, att: &GpuAttestation) -> Result<DeviceStatus, CoreError> {
        let software = att.software.as_ref().ok_or_else(|| {
            CoreError::InvalidQuote("mode is Software but no software evidence present".into())
        })?;
        if software.gpu_serial.is_empty() || software.driver_version.is_empty() {
            return Err(CoreError::InvalidQuote(
                "software attestation missing serial or driver version".into(),
            ));
        }
        if software.signature.len() < 64 || software.provider_pubkey.len() < 32 {
            return Err(CoreError::InvalidSignature(
                "signature or provider pubkey too short".into(),
            ));
        }
        let now = now_unix();
        if now.saturating_sub(software.timestamp) > QUOTE_MAX_AGE_SECS {
            return Err(CoreError::QuoteExpired {
                issued_at: software.timestamp,
                now,
                max_age_secs: QUOTE_MAX_AGE_SECS,
            });
        }

        let mut score = 20.0_f64;
        score += match att.model.as_str() {
            "RTX 5090" | "RTX 5080" => 15.0,
            "GB10" => 12.0,
            "RTX 4090" | "RTX 4080" => 10.0,
            "RTX 3090" | "RTX 3080" => 8.0,
            _ => 5.0,
        };
        if !software.benchmark_hash.is_zero() && software.benchmark_time_ms != 0 {
            score += 10.0;
        }
        if software.signature.len() >= 64 && software.provider_pubkey.len() >= 32 {
            score += 10.0;
        }
        if !software.driver_version.is_empty() {
            score += 5.0;
        }
        score = score.min(60.0).max(0.0);

        Ok(DeviceStatus {
            attested: true,
            trust_score: score,
            last_seen: now,
            operator: String::new(),
            vendor: "NVIDIA".into(),
            job_history: Vec::new(),
            mode: AttestationMode::Software,
            hardware_cc: false,
        })
    }

    /// Appends `job_id` to the device's job history and refreshes
    /// `LastSeen`. A no-op for an unknown device.
    pub fn record_job_completion(&self, device_id: &DeviceId, job_id: &str) {
        let mut devices = self.devices.lock().unwrap();
        match devices.get_mut(device_id) {
            Some(status) => {
                status.job_history.push(job_id.to_string());
                status.last_seen = now_unix();
            }
            None => warn!(%device_id, "record_job_completion on unknown device"),
        }
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{LocalEvidence, SoftwareAttestation};
    use nimbus_types::Hash32;

    fn h100_local_quote() -> GpuAttestation {
        GpuAttestation {
            device_id: DeviceId::new("GPU-001"),
            model: "H100".into(),
            cc_enabled: true,
            tee_io_enabled: true,
            driver_version: "570.00".into(),
            vbios_version: "1.0".into(),
            mode: Some(AttestationMode::Local),
            local: Some(LocalEvidence {
                spdm_report: vec![0u8; 512],
                cert_chain: vec![0u8; 1024],
                rim_verified: true,
                driver_report: vec![],
                nonce: vec![],
            }),
            software: None,
        }
    }

    #[test]
    fn verify_h100_local_attestation_scores_100() {
        let verifier = Verifier::new();
        let status = verifier.verify_gpu_attestation(&h100_local_quote()).unwrap();
        assert!(status.attested);
        assert_eq!(status.vendor, "NVIDIA");
        assert_eq!(status.mode, AttestationMode::Local);
        assert!(status.hardware_cc);
        assert_eq!(status.trust_score, 100.0);
    }

    #[test]
    fn reject_non_cc_gpu_in_local_mode() {
        let verifier = Verifier::new();
        let att = GpuAttestation {
            device_id: DeviceId::new("GPU-002"),
            model: "RTX 5090".into(),
            cc_enabled: false,
            tee_io_enabled: false,
            driver_version: "1.0".into(),
            vbios_version: "1.0".into(),
            mode: Some(AttestationMode::Local),
            local: Some(LocalEvidence {
                spdm_report: vec![0u8; 512],
                cert_chain: vec![0u8; 1024],
                rim_verified: false,
                driver_report: vec![],
                nonce: vec![],
            }),
            software: None,
        };
        let err = verifier.verify_gpu_attestation(&att).unwrap_err();
        assert_eq!(
            err,
            CoreError::HardwareNotSupported(
                "GPU model does not support confidential computing".into()
            )
        );
    }

    #[test]
    fn software_attestation_for_dgx_spark_caps_at_60() {
        let verifier = Verifier::new();
        let att = GpuAttestation {
            device_id: DeviceId::new("GPU-003"),
            model: "GB10".into(),
            cc_enabled: false,
            tee_io_enabled: false,
            driver_version: "575.00".into(),
            vbios_version: "1.0".into(),
            mode: Some(AttestationMode::Software),
            local: None,
            software: Some(SoftwareAttestation {
                gpu_serial: "S".into(),
                pci_id: "0000:01:00.0".into(),
                driver_version: "575.00".into(),
                compute_caps: "8.9".into(),
                benchmark_hash: Hash32::digest(b"bench"),
                benchmark_time_ms: 1000,
                provider_pubkey: vec![0u8; 64],
                signature: vec![0u8; 128],
                timestamp: now_unix(),
                nonce: vec![],
            }),
        };
        let status = verifier.verify_gpu_attestation(&att).unwrap();
        assert_eq!(status.mode, AttestationMode::Software);
        assert!(!status.hardware_cc);
        assert!(status.trust_score >= 50.0 && status.trust_score <= 60.0);
    }

    #[test]
    fn record_job_completion_appends_history() {
        let verifier = Verifier::new();
        verifier.verify_gpu_attestation(&h100_local_quote()).unwrap();
        let device_id = DeviceId::new("GPU-001");
        verifier.record_job_completion(&device_id, "job-1");
        verifier.record_job_completion(&device_id, "job-2");
        let status = verifier.device_status(&device_id).unwrap();
        assert_eq!(status.job_history, vec!["job-1", "job-2"]);
    }

    #[test]
    fn record_job_completion_on_unknown_device_is_noop() {
        let verifier = Verifier::new();
        verifier.record_job_completion(&DeviceId::new("ghost"), "job-1");
        assert!(verifier.device_status(&DeviceId::new("ghost")).is_none());
    }

    #[test]
    fn cpu_attestation_rejects_unknown_tee_kind() {
        let verifier = Verifier::new();
        let quote = AttestationQuote {
            kind: TeeKind::Unknown,
            version: 1,
            quote: vec![1u8; 10],
            measurement: vec![],
            report_data: vec![],
            nonce: vec![],
            timestamp: now_unix(),
        };
        assert!(matches!(
            verifier.verify_cpu_attestation(&quote, None),
            Err(CoreError::UnsupportedTEE(_))
        ));
    }
}
