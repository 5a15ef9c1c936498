// ============================================================================
// NIMBUS METRICS - Observability & Instrumentation
// ============================================================================
// PURPOSE: Prometheus metrics for monitoring control-plane health.
//
// KEY METRICS:
// - Attestation: quotes_verified, quotes_rejected, trust_score
// - Scheduler: tasks_submitted, tasks_completed, tasks_failed, pending_tasks
// - Ledger: receipts_accepted, receipts_rejected, reward_per_receipt
//
// USAGE:
//   SCHEDULER_METRICS.tasks_submitted.inc();
//   LEDGER_METRICS.reward_per_receipt.observe(reward_lux);
// ============================================================================

pub mod attestation;
pub mod exporter;
pub mod ledger;
pub mod scheduler;

pub use attestation::ATTESTATION_METRICS;
pub use ledger::LEDGER_METRICS;
pub use scheduler::SCHEDULER_METRICS;
