use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::etf::EtfProfile;
use crate::models::sector::SectorInfo;

/// The kinds of reference data a provider can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// ETF holdings by fund symbol
    EtfHoldings,
    /// Sector / industry by company symbol
    CompanyOverview,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKind::EtfHoldings => write!(f, "ETF holdings"),
            LookupKind::CompanyOverview => write!(f, "company overview"),
        }
    }
}

/// Trait abstraction for network reference-data sources.
///
/// Both lookups are batch calls: one request covers the whole symbol set.
/// Partial answers are normal; symbols a provider cannot resolve are simply
/// absent from the returned map. An `Err` means the whole call failed and
/// the caller falls back to static data.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ReferenceDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which lookups this provider can serve.
    fn supported_lookups(&self) -> Vec<LookupKind>;

    /// Resolve ETF holdings for a batch of symbols.
    async fn get_etf_profiles(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, EtfProfile>, CoreError>;

    /// Resolve sector / industry for a batch of symbols.
    async fn get_company_overviews(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SectorInfo>, CoreError>;
}
