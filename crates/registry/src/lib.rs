// ============================================================================
// NIMBUS REGISTRY - Live Provider Table
// ============================================================================
// PURPOSE: Tracks provider liveness, reputation, stake, and per-provider
// concurrency (C5). Plain data, no internal locking — the scheduler holds
// this behind its single reader-writer lock alongside the task table.
// ============================================================================

pub mod ewma;
pub mod provider;
pub mod registry;

pub use ewma::Ewma;
pub use provider::{Provider, ProviderStatus, DEFAULT_EWMA_ALPHA, DEFAULT_MAX_TASKS};
pub use registry::ProviderRegistry;
