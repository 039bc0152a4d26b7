use std::collections::HashMap;

use crate::catalog::Catalogs;
use crate::models::cache::LookupCache;
use crate::models::etf::EtfProfile;
use crate::models::holding::Holding;
use crate::models::sector::SectorInfo;
use crate::models::settings::ResolutionPolicy;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::LookupKind;

use super::resolution::{resolve_with_fallback, unique_symbols};
use super::translation_service::EtfPosition;

/// Resolves sector / industry per ticker. Unresolved tickers stay unknown;
/// that is never an error.
pub struct SectorService;

impl SectorService {
    pub fn new() -> Self {
        Self
    }

    /// Union of direct-stock tickers and every constituent ticker of the
    /// resolved profiles, in first-seen order.
    pub fn symbols_for(
        &self,
        direct: &[&Holding],
        positions: &[EtfPosition],
        profiles: &HashMap<String, EtfProfile>,
    ) -> Vec<String> {
        let direct_symbols: Vec<String> = direct.iter().filter_map(|h| h.symbol()).collect();
        let constituent_symbols = positions
            .iter()
            .filter_map(|p| profiles.get(&p.symbol))
            .flat_map(|profile| profile.constituents.iter().map(|c| c.symbol.as_str()));

        unique_symbols(
            direct_symbols
                .iter()
                .map(String::as_str)
                .chain(constituent_symbols),
        )
    }

    pub async fn resolve(
        &self,
        symbols: &[String],
        catalogs: &Catalogs,
        cache: &dyn LookupCache<SectorInfo>,
        registry: &ProviderRegistry,
        policy: ResolutionPolicy,
    ) -> HashMap<String, SectorInfo> {
        resolve_with_fallback(
            LookupKind::CompanyOverview,
            symbols,
            cache,
            policy,
            registry.has_provider_for(LookupKind::CompanyOverview),
            |symbol| catalogs.sector(symbol).cloned(),
            |pending| async move { registry.fetch_company_overviews(&pending).await },
        )
        .await
    }
}

impl Default for SectorService {
    fn default() -> Self {
        Self::new()
    }
}
