use num_bigint::BigUint;
use num_traits::Zero;
use nimbus_types::ProviderId;

use crate::ewma::Ewma;

/// Per-provider reward bookkeeping. `PendingRewards` is always non-negative
/// (it's a `BigUint`); `TotalRewards` only ever grows.
#[derive(Debug, Clone)]
pub struct ProviderRewardAccount {
    pub provider_id: ProviderId,
    pub tasks_completed: u64,
    pub total_rewards: BigUint,
    pub pending_rewards: BigUint,
    uptime: Ewma,
    avg_latency: Ewma,
    pub slashed: bool,
}

impl ProviderRewardAccount {
    pub fn new(provider_id: ProviderId) -> Self {
        ProviderRewardAccount {
            provider_id,
            tasks_completed: 0,
            total_rewards: BigUint::zero(),
            pending_rewards: BigUint::zero(),
            uptime: Ewma::new(0.9),
            avg_latency: Ewma::new(0.9),
            slashed: false,
        }
    }

    pub fn record_receipt(&mut self, reward: &BigUint, compute_time_ms: u64) {
        self.tasks_completed += 1;
        self.total_rewards += reward;
        self.pending_rewards += reward;
        self.avg_latency.update(compute_time_ms as f64);
        self.uptime.update(100.0);
    }

    pub fn avg_latency_ms(&self) -> f64 {
        self.avg_latency.value()
    }

    pub fn uptime_percentage(&self) -> f64 {
        if self.uptime.initialized() {
            self.uptime.value()
        } else {
            100.0
        }
    }

    /// Atomically transfers `PendingRewards` to zero and returns the amount
    /// claimed as a decimal string. Known providers never error; a provider
    /// with nothing pending simply claims "0".
    pub fn claim(&mut self) -> String {
        let claimed = std::mem::replace(&mut self.pending_rewards, BigUint::zero());
        claimed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_idempotent() {
        let mut account = ProviderRewardAccount::new(ProviderId::new("p1"));
        account.record_receipt(&BigUint::from(500u64), 100);
        assert_eq!(account.claim(), "500");
        assert_eq!(account.claim(), "0");
        assert_eq!(account.total_rewards, BigUint::from(500u64));
    }

    #[test]
    fn total_rewards_is_monotonically_non_decreasing() {
        let mut account = ProviderRewardAccount::new(ProviderId::new("p1"));
        account.record_receipt(&BigUint::from(100u64), 50);
        let after_first = account.total_rewards.clone();
        account.claim();
        account.record_receipt(&BigUint::from(50u64), 50);
        assert!(account.total_rewards >= after_first);
    }
}
