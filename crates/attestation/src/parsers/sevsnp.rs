use nimbus_types::CoreError;

pub const SEV_SNP_MIN_LEN: usize = 1184;

/// Strongly-typed view over an AMD SEV-SNP attestation report. Offsets match
/// the fixed little-endian layout of the external interface contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SevSnpReport {
    pub version: u32,
    pub guest_svn: u32,
    pub policy: u64,
    pub family_id: [u8; 16],
    pub image_id: [u8; 16],
    pub vmpl: u32,
    pub sig_algo: u32,
    pub platform_version: u64,
    pub platform_info: u64,
    pub author_key_en: u32,
    pub report_data: [u8; 64],
    pub measurement: [u8; 48],
    pub host_data: [u8; 32],
    pub id_key_digest: [u8; 48],
    pub author_key_digest: [u8; 48],
    pub report_id: [u8; 32],
    pub report_id_ma: [u8; 32],
    pub reported_tcb: u64,
    pub chip_id: [u8; 64],
    pub signature: [u8; 512],
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes[offset..offset + N]);
    arr
}

/// Parsing never side-effects and never validates cryptographic signatures;
/// the only rejection before parsing proceeds is the minimum-length check.
pub fn parse(bytes: &[u8]) -> Result<SevSnpReport, CoreError> {
    if bytes.len() < SEV_SNP_MIN_LEN {
        return Err(CoreError::InvalidQuote(format!(
            "SEV-SNP report too short: {} bytes, need at least {}",
            bytes.len(),
            SEV_SNP_MIN_LEN
        )));
    }
    Ok(SevSnpReport {
        version: read_u32(bytes, 0),
        guest_svn: read_u32(bytes, 4),
        policy: read_u64(bytes, 8),
        family_id: read_array(bytes, 16),
        image_id: read_array(bytes, 32),
        vmpl: read_u32(bytes, 48),
        sig_algo: read_u32(bytes, 52),
        platform_version: read_u64(bytes, 56),
        platform_info: read_u64(bytes, 64),
        author_key_en: read_u32(bytes, 72),
        report_data: read_array(bytes, 76),
        measurement: read_array(bytes, 140),
        host_data: read_array(bytes, 188),
        id_key_digest: read_array(bytes, 220),
        author_key_digest: read_array(bytes, 268),
        report_id: read_array(bytes, 316),
        report_id_ma: read_array(bytes, 348),
        reported_tcb: read_u64(bytes, 380),
        chip_id: read_array(bytes, 388),
        signature: read_array(bytes, 672),
    })
}

/// Serializes a report back into the fixed layout, used by the
/// Parse(Serialize(r)) == r round-trip property.
pub fn serialize(report: &SevSnpReport) -> Vec<u8> {
    let mut buf = vec![0u8; SEV_SNP_MIN_LEN];
    buf[0..4].copy_from_slice(&report.version.to_le_bytes());
    buf[4..8].copy_from_slice(&report.guest_svn.to_le_bytes());
    buf[8..16].copy_from_slice(&report.policy.to_le_bytes());
    buf[16..32].copy_from_slice(&report.family_id);
    buf[32..48].copy_from_slice(&report.image_id);
    buf[48..52].copy_from_slice(&report.vmpl.to_le_bytes());
    buf[52..56].copy_from_slice(&report.sig_algo.to_le_bytes());
    buf[56..64].copy_from_slice(&report.platform_version.to_le_bytes());
    buf[64..72].copy_from_slice(&report.platform_info.to_le_bytes());
    buf[72..76].copy_from_slice(&report.author_key_en.to_le_bytes());
    buf[76..140].copy_from_slice(&report.report_data);
    buf[140..188].copy_from_slice(&report.measurement);
    buf[188..220].copy_from_slice(&report.host_data);
    buf[220..268].copy_from_slice(&report.id_key_digest);
    buf[268..316].copy_from_slice(&report.author_key_digest);
    buf[316..348].copy_from_slice(&report.report_id);
    buf[348..380].copy_from_slice(&report.report_id_ma);
    buf[380..388].copy_from_slice(&report.reported_tcb.to_le_bytes());
    buf[388..452].copy_from_slice(&report.chip_id);
    buf[672..1184].copy_from_slice(&report.signature);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_short_buffers() {
        assert!(parse(&[0u8; SEV_SNP_MIN_LEN - 1]).is_err());
    }

    #[test]
    fn parses_minimum_length_buffer() {
        let bytes = vec![0u8; SEV_SNP_MIN_LEN];
        let report = parse(&bytes).expect("should parse");
        assert_eq!(report.version, 0);
        assert_eq!(report.measurement, [0u8; 48]);
    }

    fn arb_report() -> impl Strategy<Value = SevSnpReport> {
        (
            any::<u32>(),
            any::<u32>(),
            any::<u64>(),
            any::<[u8; 16]>(),
            any::<[u8; 16]>(),
            any::<u32>(),
            any::<u32>(),
        )
            .prop_flat_map(
                |(version, guest_svn, policy, family_id, image_id, vmpl, sig_algo)| {
                    (
                        any::<u64>(),
                        any::<u64>(),
                        any::<u32>(),
                        proptest::collection::vec(any::<u8>(), 64),
                        proptest::collection::vec(any::<u8>(), 48),
                        proptest::collection::vec(any::<u8>(), 32),
                        proptest::collection::vec(any::<u8>(), 48),
                        proptest::collection::vec(any::<u8>(), 48),
                    )
                        .prop_map(
                            move |(
                                platform_version,
                                platform_info,
                                author_key_en,
                                report_data,
                                measurement,
                                host_data,
                                id_key_digest,
                                author_key_digest,
                            )| {
                                SevSnpReport {
                                    version,
                                    guest_svn,
                                    policy,
                                    family_id,
                                    image_id,
                                    vmpl,
                                    sig_algo,
                                    platform_version,
                                    platform_info,
                                    author_key_en,
                                    report_data: report_data.try_into().unwrap(),
                                    measurement: measurement.try_into().unwrap(),
                                    host_data: host_data.try_into().unwrap(),
                                    id_key_digest: id_key_digest.try_into().unwrap(),
                                    author_key_digest: author_key_digest.try_into().unwrap(),
                                    report_id: [0u8; 32],
                                    report_id_ma: [0u8; 32],
                                    reported_tcb: 0,
                                    chip_id: [0u8; 64],
                                    signature: [0u8; 512],
                                }
                            },
                        )
                },
            )
    }

    proptest! {
        #[test]
        fn round_trips_through_serialize(report in arb_report()) {
            let bytes = serialize(&report);
            let parsed = parse(&bytes).unwrap();
            prop_assert_eq!(parsed, report);
        }
    }
}
