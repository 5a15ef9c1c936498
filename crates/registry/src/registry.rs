use std::collections::HashMap;

use nimbus_attestation::Verifier;
use nimbus_types::{CoreError, ProviderId};
use tracing::info;

use crate::provider::Provider;

/// The live provider table (C5). Plain data with no internal locking: the
/// scheduler wraps this, the task table, and the model catalog behind a
/// single reader-writer lock per the concurrency contract.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Provider>,
    /// Preserves registration order for the assignment tie-break rule
    /// (earliest-registered wins).
    insertion_order: Vec<ProviderId>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry {
            providers: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }

    /// Validates any supplied CPU/GPU attestation on `provider` via
    /// `verifier`, checks the tier's minimum stake, and only then inserts
    /// the provider. On GPU verification success, `Reputation` is seeded
    /// from `DeviceStatus.TrustScore`. Verification errors are surfaced to
    /// the caller and never mutate registry state.
    pub fn register(&mut self, verifier: &Verifier, mut provider: Provider) -> Result<(), CoreError> {
        if let Some(min_stake) = provider.tier.params().map(|p| p.min_stake_lux) {
            if provider.stake_lux < min_stake {
                return Err(CoreError::InsufficientStake {
                    have: provider.stake_lux,
                    need: min_stake,
                });
            }
        }

        if let Some(quote) = &provider.cpu_attestation {
            verifier.verify_cpu_attestation(quote, None)?;
        }

        if let Some(gpu_att) = &provider.gpu_attestation {
            let status = verifier.verify_gpu_attestation(gpu_att)?;
            provider.reputation = status.trust_score;
        }

        info!(provider_id = %provider.id, tier = ?provider.tier, "provider registered");
        let id = provider.id.clone();
        if !self.providers.contains_key(&id) {
            self.insertion_order.push(id.clone());
        }
        self.providers.insert(id, provider);
        Ok(())
    }

    pub fn heartbeat(&mut self, id: &ProviderId, now: u64) {
        if let Some(provider) = self.providers.get_mut(id) {
            provider.status.record_heartbeat(now);
        }
    }

    pub fn online(&self, id: &ProviderId, max_heartbeat_age_secs: u64, now: u64) -> bool {
        self.providers
            .get(id)
            .map(|p| p.status.is_online(now, max_heartbeat_age_secs))
            .unwrap_or(false)
    }

    pub fn set_slashed(&mut self, id: &ProviderId, slashed: bool) {
        if let Some(provider) = self.providers.get_mut(id) {
            provider.slashed = slashed;
        }
    }

    pub fn increment_current(&mut self, id: &ProviderId) -> Result<(), CoreError> {
        let provider = self
            .providers
            .get_mut(id)
            .ok_or_else(|| CoreError::TaskNotFound(format!("unknown provider {id}")))?;
        if provider.status.current_tasks >= provider.status.max_tasks {
            return Err(CoreError::InvalidTask(format!(
                "provider {id} has no free capacity"
            )));
        }
        provider.status.current_tasks += 1;
        Ok(())
    }

    pub fn decrement_current(&mut self, id: &ProviderId) {
        if let Some(provider) = self.providers.get_mut(id) {
            provider.status.current_tasks = provider.status.current_tasks.saturating_sub(1);
        }
    }

    pub fn get(&self, id: &ProviderId) -> Option<&Provider> {
        self.providers.get(id)
    }

    pub fn get_mut(&mut self, id: &ProviderId) -> Option<&mut Provider> {
        self.providers.get_mut(id)
    }

    /// Iterates providers in registration order, the order the assignment
    /// tie-break rule depends on.
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.providers.get(id))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_tier::CCTier;

    fn provider(id: &str, tier: CCTier, stake: u128) -> Provider {
        Provider::new(
            ProviderId::new(id),
            "0xabc".into(),
            format!("http://{id}"),
            vec![],
            tier,
            stake,
            0,
        )
    }

    #[test]
    fn register_rejects_insufficient_stake() {
        let verifier = Verifier::new();
        let mut registry = ProviderRegistry::new();
        let err = registry
            .register(&verifier, provider("p1", CCTier::Tier1, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStake { .. }));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_succeeds_with_sufficient_stake() {
        let verifier = Verifier::new();
        let mut registry = ProviderRegistry::new();
        registry
            .register(&verifier, provider("p1", CCTier::Tier4, 1_000))
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved_for_tie_break() {
        let verifier = Verifier::new();
        let mut registry = ProviderRegistry::new();
        registry
            .register(&verifier, provider("p2", CCTier::Tier4, 1_000))
            .unwrap();
        registry
            .register(&verifier, provider("p1", CCTier::Tier4, 1_000))
            .unwrap();
        let ids: Vec<String> = registry.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["p2".to_string(), "p1".to_string()]);
    }

    #[test]
    fn increment_current_respects_max_tasks() {
        let verifier = Verifier::new();
        let mut registry = ProviderRegistry::new();
        registry
            .register(&verifier, provider("p1", CCTier::Tier4, 1_000))
            .unwrap();
        let id = ProviderId::new("p1");
        for _ in 0..10 {
            registry.increment_current(&id).unwrap();
        }
        assert!(registry.increment_current(&id).is_err());
        registry.decrement_current(&id);
        assert!(registry.increment_current(&id).is_ok());
    }
}
