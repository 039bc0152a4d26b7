use std::collections::HashMap;

use crate::catalog::Catalogs;
use crate::models::cache::LookupCache;
use crate::models::etf::EtfProfile;
use crate::models::settings::ResolutionPolicy;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::LookupKind;

use super::resolution::{resolve_with_fallback, unique_symbols};
use super::translation_service::EtfPosition;

/// Resolves ETF symbols to their constituent profiles.
///
/// Lookup order is cache, static catalog, then one batch network call
/// (see `ResolutionPolicy`). Symbols nobody can resolve are simply absent
/// from the result and contribute no look-through exposure.
pub struct ConstituentService;

impl ConstituentService {
    pub fn new() -> Self {
        Self
    }

    /// Distinct ETF symbols across real and synthetic positions, in order.
    pub fn symbols_for(&self, positions: &[EtfPosition]) -> Vec<String> {
        unique_symbols(positions.iter().map(|p| p.symbol.as_str()))
    }

    pub async fn resolve(
        &self,
        symbols: &[String],
        catalogs: &Catalogs,
        cache: &dyn LookupCache<EtfProfile>,
        registry: &ProviderRegistry,
        policy: ResolutionPolicy,
    ) -> HashMap<String, EtfProfile> {
        resolve_with_fallback(
            LookupKind::EtfHoldings,
            symbols,
            cache,
            policy,
            registry.has_provider_for(LookupKind::EtfHoldings),
            |symbol| catalogs.etf_profile(symbol).cloned(),
            |pending| async move {
                registry
                    .fetch_etf_profiles(&pending)
                    .await
                    .map(|profiles| with_catalog_names(profiles, catalogs))
            },
        )
        .await
    }
}

/// Providers without a fund name label the profile with its ticker; the
/// catalog name is preferred for those when one exists.
fn with_catalog_names(
    profiles: HashMap<String, EtfProfile>,
    catalogs: &Catalogs,
) -> HashMap<String, EtfProfile> {
    profiles
        .into_iter()
        .map(|(symbol, mut profile)| {
            if profile.name.trim().eq_ignore_ascii_case(&profile.symbol) {
                if let Some(known) = catalogs.etf_profile(&symbol) {
                    profile.name = known.name.clone();
                }
            }
            (symbol, profile)
        })
        .collect()
}

impl Default for ConstituentService {
    fn default() -> Self {
        Self::new()
    }
}
