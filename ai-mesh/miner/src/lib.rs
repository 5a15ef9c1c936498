// ============================================================================
// NIMBUS MINER - Provider Agent
// ============================================================================
// PURPOSE: Provider-side agent that registers with a nimbus-node instance,
// presents hardware attestation, and polls/completes pending tasks.
//
// WORKFLOW:
// 1. Register with the node (POST /api/miners/register)
// 2. Poll for pending tasks (GET /api/tasks/pending)
// 3. "Execute" the task (opaque passthrough, no inference kernel here)
// 4. Submit the result (POST /api/tasks/submit)
//
// No inference logic lives here; actual model execution is out of scope for
// this agent, same as for the control plane it talks to.
// ============================================================================

pub mod agent;
pub mod config;

pub use agent::MinerAgent;
pub use config::MinerConfig;
