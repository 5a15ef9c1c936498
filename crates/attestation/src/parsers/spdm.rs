use nimbus_types::CoreError;

pub const SPDM_MIN_REPORT_LEN: usize = 256;
pub const SPDM_MIN_CERT_CHAIN_LEN: usize = 256;

/// Validates the length preconditions for a local GPU SPDM attestation
/// payload. SPDM evidence is opaque to the core beyond its length; signature
/// and RIM verification are named hooks (see the verifier) rather than
/// implemented here.
pub fn check_lengths(report: &[u8], cert_chain: &[u8]) -> Result<(), CoreError> {
    if report.len() < SPDM_MIN_REPORT_LEN {
        return Err(CoreError::InvalidQuote(format!(
            "SPDM report too short: {} bytes, need at least {}",
            report.len(),
            SPDM_MIN_REPORT_LEN
        )));
    }
    if cert_chain.len() < SPDM_MIN_CERT_CHAIN_LEN {
        return Err(CoreError::InvalidQuote(format!(
            "SPDM cert chain too short: {} bytes, need at least {}",
            cert_chain.len(),
            SPDM_MIN_CERT_CHAIN_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_report() {
        assert!(check_lengths(&[0u8; 255], &[0u8; 256]).is_err());
    }

    #[test]
    fn rejects_short_cert_chain() {
        assert!(check_lengths(&[0u8; 256], &[0u8; 255]).is_err());
    }

    #[test]
    fn accepts_minimum_lengths() {
        assert!(check_lengths(&[0u8; 256], &[0u8; 256]).is_ok());
    }
}
