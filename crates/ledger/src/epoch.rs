use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// A discrete reward accounting interval. Invariant:
/// `participation_share + task_share == 1.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRewardPool {
    pub epoch_number: u64,
    pub epoch_duration_secs: u64,
    pub total_pool_lux: BigUint,
    pub participation_share: f64,
    pub task_share: f64,
}

impl EpochRewardPool {
    pub fn new(epoch_number: u64, epoch_duration_secs: u64, total_pool_lux: BigUint) -> Self {
        EpochRewardPool {
            epoch_number,
            epoch_duration_secs,
            total_pool_lux,
            participation_share: 0.30,
            task_share: 0.70,
        }
    }

    /// Shares are modifiable per-pool but must sum to 1.0.
    pub fn with_shares(mut self, participation_share: f64, task_share: f64) -> Self {
        self.participation_share = participation_share;
        self.task_share = task_share;
        self
    }

    pub fn shares_are_valid(&self) -> bool {
        (self.participation_share + self.task_share - 1.0).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shares_sum_to_one() {
        let pool = EpochRewardPool::new(1, 3600, BigUint::from(1_000_000u64));
        assert!(pool.shares_are_valid());
        assert_eq!(pool.participation_share, 0.30);
        assert_eq!(pool.task_share, 0.70);
    }

    #[test]
    fn custom_shares_can_be_validated() {
        let pool = EpochRewardPool::new(1, 3600, BigUint::from(1u64)).with_shares(0.5, 0.5);
        assert!(pool.shares_are_valid());
        let bad = EpochRewardPool::new(1, 3600, BigUint::from(1u64)).with_shares(0.5, 0.4);
        assert!(!bad.shares_are_valid());
    }
}
