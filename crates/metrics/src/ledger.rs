use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};

pub struct LedgerMetrics {
    pub receipts_accepted: IntCounter,
    pub receipts_rejected: IntCounter,
    pub claims_processed: IntCounter,
    pub reward_per_receipt: Histogram,
}

impl LedgerMetrics {
    fn new() -> Self {
        LedgerMetrics {
            receipts_accepted: register_int_counter!(
                "nimbus_ledger_receipts_accepted",
                "Number of task receipts accepted into the reward ledger"
            )
            .expect("register receipts_accepted"),
            receipts_rejected: register_int_counter!(
                "nimbus_ledger_receipts_rejected",
                "Number of task receipts rejected, e.g. duplicate job IDs"
            )
            .expect("register receipts_rejected"),
            claims_processed: register_int_counter!(
                "nimbus_ledger_claims_processed",
                "Number of reward claim requests processed"
            )
            .expect("register claims_processed"),
            reward_per_receipt: register_histogram!(
                "nimbus_ledger_reward_per_receipt",
                "Distribution of computed rewards per accepted receipt, in LUX"
            )
            .expect("register reward_per_receipt"),
        }
    }
}

pub static LEDGER_METRICS: Lazy<LedgerMetrics> = Lazy::new(LedgerMetrics::new);
