use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::etf::{EtfConstituent, EtfProfile};
use crate::models::holding::normalize_symbol;
use crate::models::sector::SectorInfo;
use crate::models::settings::EngineSettings;

use super::alphavantage::AlphaVantageProvider;
use super::batch_http::BatchHttpProvider;
use super::traits::{LookupKind, ReferenceDataProvider};

/// Registry of all available reference-data providers.
///
/// Routes lookups to providers by `LookupKind` and walks them in
/// registration order: each provider is only asked for the symbols its
/// predecessors left unresolved.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn ReferenceDataProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with every provider the settings enable.
    pub fn new_with_defaults(settings: &EngineSettings) -> Self {
        let mut registry = Self::new();

        // Batch endpoint first: one round-trip for the whole symbol set
        if let Some(endpoint) = &settings.batch_endpoint {
            registry.register(Box::new(BatchHttpProvider::new(
                endpoint.clone(),
                settings.network_timeout_secs,
                settings.max_batch_size,
            )));
        }

        // Alpha Vantage: requires API key, one request per symbol
        if let Some(key) = settings.api_keys.get("alphavantage") {
            registry.register(Box::new(AlphaVantageProvider::new(
                key.clone(),
                settings.network_timeout_secs,
            )));
        }

        registry
    }

    /// Register a new provider. Earlier registrations take priority.
    pub fn register(&mut self, provider: Box<dyn ReferenceDataProvider>) {
        self.providers.push(provider);
    }

    pub fn has_provider_for(&self, kind: LookupKind) -> bool {
        self.providers
            .iter()
            .any(|p| p.supported_lookups().contains(&kind))
    }

    /// Names of all providers serving a lookup kind, in priority order.
    pub fn get_provider_names(&self, kind: LookupKind) -> Vec<String> {
        self.get_providers_for(kind)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Return ALL providers that support the given lookup, ordered by registration priority.
    pub fn get_providers_for(&self, kind: LookupKind) -> Vec<&dyn ReferenceDataProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_lookups().contains(&kind))
            .map(|p| p.as_ref())
            .collect()
    }

    /// Batch-resolve ETF profiles with fallback across providers.
    ///
    /// Returns whatever was resolved. `Err` only when every provider
    /// failed outright (or none exists) and nothing was resolved.
    pub async fn fetch_etf_profiles(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, EtfProfile>, CoreError> {
        let mut resolved: HashMap<String, EtfProfile> = HashMap::new();
        let mut last_error = None;

        for provider in self.get_providers_for(LookupKind::EtfHoldings) {
            let pending: Vec<String> = symbols
                .iter()
                .filter(|s| !resolved.contains_key(*s))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }
            match provider.get_etf_profiles(&pending).await {
                Ok(profiles) => {
                    for (symbol, profile) in profiles {
                        // Empty profiles are as good as a miss
                        if let Some((symbol, profile)) = normalize_profile(&symbol, profile) {
                            resolved.insert(symbol, profile);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("{} failed to fetch ETF holdings: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        finish(resolved, last_error, LookupKind::EtfHoldings, self)
    }

    /// Batch-resolve sector / industry with fallback across providers.
    pub async fn fetch_company_overviews(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SectorInfo>, CoreError> {
        let mut resolved: HashMap<String, SectorInfo> = HashMap::new();
        let mut last_error = None;

        for provider in self.get_providers_for(LookupKind::CompanyOverview) {
            let pending: Vec<String> = symbols
                .iter()
                .filter(|s| !resolved.contains_key(*s))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }
            match provider.get_company_overviews(&pending).await {
                Ok(overviews) => {
                    for (symbol, info) in overviews {
                        if let Some((symbol, info)) = normalize_overview(&symbol, info) {
                            resolved.insert(symbol, info);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("{} failed to fetch company overviews: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        finish(resolved, last_error, LookupKind::CompanyOverview, self)
    }
}

/// Provider output is keyed and joined by uppercase ticker downstream, so
/// third-party data is brought to the same shape as catalog data here.
/// Blank tickers and non-finite weights are dropped; tickers that collapse
/// to the same symbol are merged.
fn normalize_profile(symbol: &str, profile: EtfProfile) -> Option<(String, EtfProfile)> {
    let symbol = normalize_symbol(symbol)?;
    let mut constituents: Vec<EtfConstituent> = Vec::with_capacity(profile.constituents.len());
    for c in profile.constituents {
        let Some(constituent_symbol) = normalize_symbol(&c.symbol) else {
            continue;
        };
        if !c.weight_percent.is_finite() {
            continue;
        }
        match constituents.iter_mut().find(|e| e.symbol == constituent_symbol) {
            Some(existing) => existing.weight_percent += c.weight_percent,
            None => constituents.push(EtfConstituent {
                symbol: constituent_symbol,
                name: c.name,
                weight_percent: c.weight_percent,
                sector: c
                    .sector
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            }),
        }
    }
    if constituents.is_empty() {
        return None;
    }
    let name = match profile.name.trim() {
        "" => symbol.clone(),
        name => name.to_string(),
    };
    Some((symbol.clone(), EtfProfile { symbol, name, constituents }))
}

fn normalize_overview(symbol: &str, info: SectorInfo) -> Option<(String, SectorInfo)> {
    let symbol = normalize_symbol(symbol)?;
    let sector = info.sector.trim();
    if sector.is_empty() {
        return None;
    }
    let info = SectorInfo {
        sector: sector.to_string(),
        industry: info
            .industry
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty()),
    };
    Some((symbol, info))
}

fn finish<V>(
    resolved: HashMap<String, V>,
    last_error: Option<CoreError>,
    kind: LookupKind,
    registry: &ProviderRegistry,
) -> Result<HashMap<String, V>, CoreError> {
    if !resolved.is_empty() {
        return Ok(resolved);
    }
    match last_error {
        Some(e) => Err(e),
        None if !registry.has_provider_for(kind) => Err(CoreError::NoProvider(kind.to_string())),
        None => Ok(resolved),
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
