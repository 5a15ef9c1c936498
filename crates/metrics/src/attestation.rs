use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};

pub struct AttestationMetrics {
    pub quotes_verified: IntCounter,
    pub quotes_rejected: IntCounter,
    pub trust_score: Histogram,
}

impl AttestationMetrics {
    fn new() -> Self {
        AttestationMetrics {
            quotes_verified: register_int_counter!(
                "nimbus_attestation_quotes_verified",
                "Number of CPU and GPU attestation quotes that passed verification"
            )
            .expect("register quotes_verified"),
            quotes_rejected: register_int_counter!(
                "nimbus_attestation_quotes_rejected",
                "Number of attestation quotes rejected by the verifier"
            )
            .expect("register quotes_rejected"),
            trust_score: register_histogram!(
                "nimbus_attestation_trust_score",
                "Distribution of trust scores assigned to verified devices"
            )
            .expect("register trust_score"),
        }
    }
}

pub static ATTESTATION_METRICS: Lazy<AttestationMetrics> = Lazy::new(AttestationMetrics::new);
