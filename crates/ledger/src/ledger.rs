use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use nimbus_metrics::LEDGER_METRICS;
use nimbus_tier::CCTier;
use nimbus_types::{CoreError, Hash32, ProviderId, TaskId};
use num_traits::ToPrimitive;
use tracing::{info, warn};

use crate::account::ProviderRewardAccount;
use crate::merkle::compute_merkle_root;
use crate::receipt::Receipt;
use crate::rewards::{per_receipt_reward, ModelingLevel};

#[derive(Debug, Default)]
struct LedgerState {
    /// Ordered by arrival at the ledger, not by task CreatedAt.
    receipts: Vec<Receipt>,
    accounts: HashMap<ProviderId, ProviderRewardAccount>,
    seen_job_ids: HashSet<TaskId>,
}

/// The reward ledger (C7): receipt ingestion, per-provider balances, and
/// Merkle commitment. Protects its state with its own mutex, distinct from
/// the scheduler's registry lock and the verifier's device-table mutex, per
/// the Scheduler -> Verifier -> Ledger lock ordering contract.
#[derive(Debug, Default)]
pub struct RewardLedger {
    state: Mutex<LedgerState>,
}

impl RewardLedger {
    pub fn new() -> Self {
        RewardLedger {
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Appends `receipt` to the ordered receipt list and accumulates
    /// per-provider stats. Rejects a duplicate `JobID`.
    pub fn submit_receipt(
        &self,
        receipt: Receipt,
        base_rate_wei_per_ms: u128,
        tier: CCTier,
        level: ModelingLevel,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if state.seen_job_ids.contains(&receipt.job_id) {
            LEDGER_METRICS.receipts_rejected.inc();
            return Err(CoreError::InvalidTask(format!(
                "duplicate receipt for job {}",
                receipt.job_id
            )));
        }
        let reward = per_receipt_reward(base_rate_wei_per_ms, receipt.compute_time_ms, tier, level);
        LEDGER_METRICS.receipts_accepted.inc();
        LEDGER_METRICS.reward_per_receipt.observe(reward.to_f64().unwrap_or(0.0));
        let account = state
            .accounts
            .entry(receipt.provider_id.clone())
            .or_insert_with(|| ProviderRewardAccount::new(receipt.provider_id.clone()));
        account.record_receipt(&reward, receipt.compute_time_ms);

        info!(
            job_id = %receipt.job_id,
            provider_id = %receipt.provider_id,
            reward = %reward,
            "receipt accepted"
        );

        state.seen_job_ids.insert(receipt.job_id.clone());
        state.receipts.push(receipt);
        Ok(())
    }

    /// Atomically transfers a provider's pending balance to zero and
    /// returns the claimed amount as a decimal string. Known or unknown
    /// providers alike never error; an account with nothing pending (or no
    /// account at all) returns "0".
    pub fn claim_rewards(&self, provider_id: &ProviderId) -> String {
        let mut state = self.state.lock().unwrap();
        LEDGER_METRICS.claims_processed.inc();
        match state.accounts.get_mut(provider_id) {
            Some(account) => account.claim(),
            None => {
                warn!(%provider_id, "claim_rewards for provider with no receipts");
                "0".to_string()
            }
        }
    }

    pub fn account(&self, provider_id: &ProviderId) -> Option<ProviderRewardAccount> {
        self.state.lock().unwrap().accounts.get(provider_id).cloned()
    }

    /// Reads must take a snapshot under the ledger lock before iterating;
    /// this clones the receipt list rather than handing out a guard.
    pub fn receipts_snapshot(&self) -> Vec<Receipt> {
        self.state.lock().unwrap().receipts.clone()
    }

    pub fn compute_merkle_root(&self) -> Hash32 {
        let receipts = self.receipts_snapshot();
        compute_merkle_root(&receipts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_types::Hash32 as H;

    fn receipt(job_id: &str, provider_id: &str) -> Receipt {
        Receipt {
            job_id: TaskId::new(job_id),
            provider_id: ProviderId::new(provider_id),
            model_hash: H::digest(b"model"),
            input_hash: H::digest(b"input"),
            output_hash: H::digest(b"output"),
            compute_time_ms: 1000,
            timestamp: 0,
            proof: vec![],
        }
    }

    #[test]
    fn duplicate_job_id_is_rejected() {
        let ledger = RewardLedger::new();
        ledger
            .submit_receipt(receipt("job-1", "p1"), 1, CCTier::Tier1, ModelingLevel::Standard)
            .unwrap();
        let err = ledger
            .submit_receipt(receipt("job-1", "p1"), 1, CCTier::Tier1, ModelingLevel::Standard)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTask(_)));
    }

    #[test]
    fn claim_idempotence_and_total_rewards_accounting() {
        let ledger = RewardLedger::new();
        ledger
            .submit_receipt(receipt("job-1", "p1"), 1_000, CCTier::Tier1, ModelingLevel::Standard)
            .unwrap();
        let account_before = ledger.account(&ProviderId::new("p1")).unwrap();
        let reward = account_before.pending_rewards.clone();

        let claimed = ledger.claim_rewards(&ProviderId::new("p1"));
        assert_eq!(claimed, reward.to_string());
        assert_eq!(ledger.claim_rewards(&ProviderId::new("p1")), "0");

        let account_after = ledger.account(&ProviderId::new("p1")).unwrap();
        assert_eq!(account_after.total_rewards, reward);
    }

    #[test]
    fn claim_rewards_for_unknown_provider_returns_zero() {
        let ledger = RewardLedger::new();
        assert_eq!(ledger.claim_rewards(&ProviderId::new("ghost")), "0");
    }

    #[test]
    fn merkle_root_of_empty_ledger_is_zero() {
        let ledger = RewardLedger::new();
        assert!(ledger.compute_merkle_root().is_zero());
    }
}
