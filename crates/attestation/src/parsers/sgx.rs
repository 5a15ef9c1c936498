use nimbus_types::CoreError;

pub const SGX_MIN_LEN: usize = 432;
const MRENCLAVE_OFFSET: usize = 112;
const MRENCLAVE_LEN: usize = 32;

/// Extracts `mrenclave` (bytes [112, 144)) from a raw SGX quote. The only
/// precondition checked here is the minimum length; signature verification
/// is delegated to the verifier.
pub fn parse_mrenclave(bytes: &[u8]) -> Result<[u8; MRENCLAVE_LEN], CoreError> {
    if bytes.len() < SGX_MIN_LEN {
        return Err(CoreError::InvalidQuote(format!(
            "SGX quote too short: {} bytes, need at least {}",
            bytes.len(),
            SGX_MIN_LEN
        )));
    }
    let mut mrenclave = [0u8; MRENCLAVE_LEN];
    mrenclave.copy_from_slice(&bytes[MRENCLAVE_OFFSET..MRENCLAVE_OFFSET + MRENCLAVE_LEN]);
    Ok(mrenclave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffers() {
        assert!(parse_mrenclave(&[0u8; SGX_MIN_LEN - 1]).is_err());
    }

    #[test]
    fn extracts_mrenclave_at_fixed_offset() {
        let mut bytes = vec![0u8; SGX_MIN_LEN];
        for (i, b) in bytes[MRENCLAVE_OFFSET..MRENCLAVE_OFFSET + MRENCLAVE_LEN]
            .iter_mut()
            .enumerate()
        {
            *b = i as u8;
        }
        let mrenclave = parse_mrenclave(&bytes).unwrap();
        assert_eq!(mrenclave, core::array::from_fn(|i| i as u8));
    }
}
