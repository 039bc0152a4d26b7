use std::collections::{HashMap, HashSet};
use std::future::Future;

use crate::errors::CoreError;
use crate::models::cache::LookupCache;
use crate::models::settings::ResolutionPolicy;
use crate::providers::traits::LookupKind;

/// Uppercase and de-duplicate symbols, keeping first-seen order.
pub fn unique_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Cache → catalog → network resolution shared by both resolvers.
///
/// Never fails: a network error is logged and the static answer stands.
/// Every resolved value is written back to the cache; misses are not.
pub async fn resolve_with_fallback<V, C, F, Fut>(
    kind: LookupKind,
    symbols: &[String],
    cache: &dyn LookupCache<V>,
    policy: ResolutionPolicy,
    network_available: bool,
    catalog_lookup: C,
    fetch: F,
) -> HashMap<String, V>
where
    V: Clone,
    C: Fn(&str) -> Option<V>,
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = Result<HashMap<String, V>, CoreError>>,
{
    let mut resolved: HashMap<String, V> = HashMap::with_capacity(symbols.len());
    let mut uncached: Vec<String> = Vec::new();

    for symbol in symbols {
        match cache.get(symbol) {
            Some(value) => {
                resolved.insert(symbol.clone(), value);
            }
            None => uncached.push(symbol.clone()),
        }
    }
    let cache_hits = resolved.len();

    let use_network = network_available && policy != ResolutionPolicy::StaticOnly;
    let mut from_network: HashMap<String, V> = HashMap::new();

    if policy == ResolutionPolicy::PreferNetwork && use_network && !uncached.is_empty() {
        from_network = fetch_or_log(kind, uncached.clone(), fetch).await;
        fill(&mut resolved, &uncached, cache, |s| from_network.get(s).cloned());
        fill(&mut resolved, &uncached, cache, &catalog_lookup);
    } else {
        fill(&mut resolved, &uncached, cache, &catalog_lookup);
        let misses: Vec<String> = uncached
            .iter()
            .filter(|s| !resolved.contains_key(*s))
            .cloned()
            .collect();
        if use_network && !misses.is_empty() {
            from_network = fetch_or_log(kind, misses.clone(), fetch).await;
            fill(&mut resolved, &misses, cache, |s| from_network.get(s).cloned());
        }
    }

    let unresolved: Vec<&String> = symbols.iter().filter(|s| !resolved.contains_key(*s)).collect();
    if !unresolved.is_empty() {
        log::debug!("No {kind} data for {} symbol(s): {:?}", unresolved.len(), unresolved);
    }
    log::debug!(
        "Resolved {kind} for {}/{} symbols ({cache_hits} cached, {} from network)",
        resolved.len(),
        symbols.len(),
        from_network.len()
    );

    resolved
}

/// Copy lookups for still-unresolved symbols into the result and cache.
fn fill<V: Clone>(
    resolved: &mut HashMap<String, V>,
    symbols: &[String],
    cache: &dyn LookupCache<V>,
    lookup: impl Fn(&str) -> Option<V>,
) {
    for symbol in symbols {
        if resolved.contains_key(symbol) {
            continue;
        }
        if let Some(value) = lookup(symbol) {
            cache.set(symbol, value.clone());
            resolved.insert(symbol.clone(), value);
        }
    }
}

async fn fetch_or_log<V, F, Fut>(kind: LookupKind, symbols: Vec<String>, fetch: F) -> HashMap<String, V>
where
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = Result<HashMap<String, V>, CoreError>>,
{
    let requested = symbols.len();
    match fetch(symbols).await {
        Ok(found) => found
            .into_iter()
            .map(|(symbol, value)| (symbol.to_uppercase(), value))
            .collect(),
        Err(e) => {
            log::warn!("{kind} lookup for {requested} symbol(s) failed, using static data: {e}");
            HashMap::new()
        }
    }
}
