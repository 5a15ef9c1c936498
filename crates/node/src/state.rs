use std::sync::Arc;

use nimbus_attestation::Verifier;
use nimbus_ledger::RewardLedger;
use nimbus_scheduler::Scheduler;

use crate::config::ResolvedConfig;

/// Shared state handed to every HTTP handler. `Scheduler` and `RewardLedger`
/// each own their own internal locking; this struct itself needs none.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub ledger: Arc<RewardLedger>,
    pub verifier: Arc<Verifier>,
    pub config: ResolvedConfig,
}

impl AppState {
    pub fn new(config: ResolvedConfig, models: Vec<String>) -> Self {
        let verifier = Arc::new(Verifier::new());
        let ledger = Arc::new(RewardLedger::new());
        let scheduler = Arc::new(Scheduler::new(verifier.clone(), ledger.clone(), models, 256));
        AppState {
            scheduler,
            ledger,
            verifier,
            config,
        }
    }
}
