use nimbus_registry::ProviderRegistry;
use nimbus_types::ProviderId;

/// Selects the best-fit provider for a task: the highest-reputation provider
/// among those that are online and have free capacity. Ties break on
/// registration order (earliest-registered wins), which is why the registry
/// iterates in insertion order rather than HashMap order.
pub fn pick_provider(
    registry: &ProviderRegistry,
    max_heartbeat_age_secs: u64,
    now: u64,
) -> Option<ProviderId> {
    let mut best: Option<(&ProviderId, f64)> = None;
    for provider in registry.iter() {
        if provider.slashed {
            continue;
        }
        if !provider.status.is_online(now, max_heartbeat_age_secs) {
            continue;
        }
        if !provider.has_capacity() {
            continue;
        }
        match best {
            Some((_, best_rep)) if provider.reputation <= best_rep => {}
            _ => best = Some((&provider.id, provider.reputation)),
        }
    }
    best.map(|(id, _)| id.clone())
}
