use nimbus_types::CoreError;

pub const TDX_MIN_LEN: usize = 584;

/// Strongly-typed view over an Intel TDX attestation quote header. Offsets
/// match the fixed little-endian layout of the external interface contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TdxQuote {
    pub version: u16,
    pub attestation_key_type: u16,
    pub tee_type: u32,
    pub reserved: [u8; 4],
    pub vendor_id: [u8; 16],
    pub user_data: [u8; 20],
    pub report_data: [u8; 64],
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes[offset..offset + N]);
    arr
}

pub fn parse(bytes: &[u8]) -> Result<TdxQuote, CoreError> {
    if bytes.len() < TDX_MIN_LEN {
        return Err(CoreError::InvalidQuote(format!(
            "TDX quote too short: {} bytes, need at least {}",
            bytes.len(),
            TDX_MIN_LEN
        )));
    }
    Ok(TdxQuote {
        version: read_u16(bytes, 0),
        attestation_key_type: read_u16(bytes, 2),
        tee_type: read_u32(bytes, 4),
        reserved: read_array(bytes, 8),
        vendor_id: read_array(bytes, 12),
        user_data: read_array(bytes, 28),
        report_data: read_array(bytes, 48),
    })
}

/// Serializes a quote header back into the fixed layout, used by the
/// Parse(Serialize(q)) == q round-trip property. Bytes beyond the header
/// (up to `TDX_MIN_LEN`) are left zeroed.
pub fn serialize(quote: &TdxQuote) -> Vec<u8> {
    let mut buf = vec![0u8; TDX_MIN_LEN];
    buf[0..2].copy_from_slice(&quote.version.to_le_bytes());
    buf[2..4].copy_from_slice(&quote.attestation_key_type.to_le_bytes());
    buf[4..8].copy_from_slice(&quote.tee_type.to_le_bytes());
    buf[8..12].copy_from_slice(&quote.reserved);
    buf[12..28].copy_from_slice(&quote.vendor_id);
    buf[28..48].copy_from_slice(&quote.user_data);
    buf[48..112].copy_from_slice(&quote.report_data);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_short_buffers() {
        assert!(parse(&[0u8; TDX_MIN_LEN - 1]).is_err());
    }

    #[test]
    fn parses_minimum_length_buffer() {
        let bytes = vec![0u8; TDX_MIN_LEN];
        let quote = parse(&bytes).expect("should parse");
        assert_eq!(quote.version, 0);
        assert_eq!(quote.report_data, [0u8; 64]);
    }

    proptest! {
        #[test]
        fn round_trips_through_serialize(
            version in any::<u16>(),
            attestation_key_type in any::<u16>(),
            tee_type in any::<u32>(),
            reserved in any::<[u8; 4]>(),
            vendor_id in any::<[u8; 16]>(),
            user_data in any::<[u8; 20]>(),
            report_data in proptest::collection::vec(any::<u8>(), 64),
        ) {
            let quote = TdxQuote {
                version,
                attestation_key_type,
                tee_type,
                reserved,
                vendor_id,
                user_data,
                report_data: report_data.try_into().unwrap(),
            };
            let bytes = serialize(&quote);
            let parsed = parse(&bytes).unwrap();
            prop_assert_eq!(parsed, quote);
        }
    }
}
