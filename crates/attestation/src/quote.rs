use serde::{Deserialize, Serialize};

/// The kind of trusted-execution-environment evidence a quote carries.
/// Closed set; `MeetsTierRequirement`-style predicates over this enum must
/// have a default branch returning the safe/unknown answer rather than
/// panicking on a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeeKind {
    Sgx,
    SevSnp,
    Tdx,
    Nvidia,
    ArmCca,
    Unknown,
}

/// An immutable attestation quote as received from a provider. Evidence
/// parsers (C1) decode `quote` lazily into a strongly-typed view; this
/// struct itself never mutates after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationQuote {
    pub kind: TeeKind,
    pub version: u32,
    pub quote: Vec<u8>,
    pub measurement: Vec<u8>,
    pub report_data: Vec<u8>,
    pub nonce: Vec<u8>,
    /// Unix timestamp (seconds) the quote was generated.
    pub timestamp: u64,
}

/// A quote is valid for one hour after `timestamp` per the fixed validity
/// window in the external interface contract.
pub const QUOTE_MAX_AGE_SECS: u64 = 3600;

impl AttestationQuote {
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > QUOTE_MAX_AGE_SECS
    }
}
