use thiserror::Error;

/// Error kinds surfaced across the attestation, scheduling, and ledger
/// subsystems. Every verification and admission error is reported to the
/// immediate caller; none cross component boundaries silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    #[error("measurement mismatch: expected {expected}, got {actual}")]
    InvalidMeasurement { expected: String, actual: String },

    #[error("quote expired: issued at {issued_at}, now {now}, max age {max_age_secs}s")]
    QuoteExpired {
        issued_at: u64,
        now: u64,
        max_age_secs: u64,
    },

    #[error("unsupported TEE kind: {0}")]
    UnsupportedTEE(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("insufficient stake: have {have}, need {need}")]
    InsufficientStake { have: u128, need: u128 },

    #[error("tier not met: have {have}, need {need}")]
    TierNotMet { have: String, need: String },

    #[error("attestation expired: {0}")]
    AttestationExpired(String),

    #[error("hardware not supported: {0}")]
    HardwareNotSupported(String),
}

impl CoreError {
    /// Maps an error kind to an HTTP status code per the external interface
    /// contract: validation -> 400, unknown resource -> 404, method mismatch
    /// -> 405 (handled by the HTTP layer directly, not here), timeout -> 504,
    /// internal -> 500.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidQuote(_)
            | CoreError::InvalidMeasurement { .. }
            | CoreError::UnsupportedTEE(_)
            | CoreError::InvalidSignature(_)
            | CoreError::InvalidTask(_)
            | CoreError::InsufficientStake { .. }
            | CoreError::TierNotMet { .. }
            | CoreError::HardwareNotSupported(_) => 400,
            CoreError::TaskNotFound(_) => 404,
            CoreError::QuoteExpired { .. } | CoreError::AttestationExpired(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_resource_maps_to_404() {
        assert_eq!(CoreError::TaskNotFound("t1".into()).status_code(), 404);
    }

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(CoreError::InvalidTask("empty id".into()).status_code(), 400);
        assert_eq!(
            CoreError::InsufficientStake { have: 0, need: 1000 }.status_code(),
            400
        );
    }
}
