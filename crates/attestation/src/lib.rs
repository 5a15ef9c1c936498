// ============================================================================
// NIMBUS ATTESTATION - TEE Evidence Parsing & Verification
// ============================================================================
// PURPOSE: Decode raw CPU/GPU attestation evidence into typed records (C1),
// expose the closed-set hardware capability model (C2), and verify that
// evidence to produce a DeviceStatus consumable by the tier classifier and
// provider registry (C3).
//
// COMPONENT CONNECTIONS:
//   Provider evidence -> parsers::{sgx,sevsnp,tdx,spdm} -> Verifier -> DeviceStatus
//
// Verification never shells out and never validates cryptographic signature
// chains; that is a named hook (see `verifier::Verifier`) an implementation
// can plug in without changing this interface.
// ============================================================================

pub mod capability;
pub mod gpu;
pub mod parsers;
pub mod quote;
pub mod verifier;

pub use capability::{is_hardware_cc_capable, model_facts, Capability, CpuTeeKind, GpuModelFacts};
pub use gpu::{AttestationMode, DeviceStatus, GpuAttestation, LocalEvidence, SoftwareAttestation};
pub use quote::{AttestationQuote, TeeKind, QUOTE_MAX_AGE_SECS};
pub use verifier::Verifier;
