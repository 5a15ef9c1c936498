// ============================================================================
// NIMBUS LEDGER - Reward Ledger
// ============================================================================
// PURPOSE: Converts completed task receipts into tamper-evident,
// on-chain-anchorable reward claims (C7): per-receipt reward calculation,
// per-provider pending balances, epoch participation/task split, and a
// Merkle commitment over the ordered receipt list.
// ============================================================================

pub mod account;
pub mod eligibility;
pub mod epoch;
pub mod ewma;
pub mod ledger;
pub mod merkle;
pub mod receipt;
pub mod rewards;

pub use account::ProviderRewardAccount;
pub use eligibility::{is_eligible_for_mining, EligibilityInputs};
pub use epoch::EpochRewardPool;
pub use ledger::RewardLedger;
pub use merkle::compute_merkle_root;
pub use receipt::Receipt;
pub use rewards::{
    calculate_block_reward_split, calculate_participation_rewards, per_receipt_reward,
    ModelingLevel, ParticipationInput,
};
