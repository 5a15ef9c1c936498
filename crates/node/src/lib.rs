// ============================================================================
// NIMBUS NODE - Control-Plane Orchestrator
// ============================================================================
// PURPOSE: Wires the verifier, scheduler and reward ledger behind an
// OpenAI-compatible + control HTTP surface, with config loading and a
// periodic scheduling tick.
// ============================================================================

pub mod config;
pub mod http;
pub mod state;

pub use config::{load_config, CliOverrides, ResolvedConfig};
pub use state::AppState;
