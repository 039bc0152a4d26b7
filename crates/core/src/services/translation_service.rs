use crate::catalog::Catalogs;
use crate::models::holding::Holding;

/// The mutual fund a synthetic ETF position was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct FundOrigin {
    pub symbol: String,
    pub name: String,
    pub notes: String,
    /// Mapping percentage applied to the fund's value
    pub percentage: f64,
}

/// An ETF position fed to constituent resolution: either a real ETF
/// holding or a synthetic one translated from a mutual fund.
#[derive(Debug, Clone, PartialEq)]
pub struct EtfPosition {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub name: String,
    pub market_value: f64,
    pub origin: Option<FundOrigin>,
}

impl EtfPosition {
    /// Wrap a real ETF holding. `None` for holdings without a ticker.
    pub fn from_holding(holding: &Holding) -> Option<Self> {
        Some(Self {
            id: holding.id.clone(),
            account_id: holding.account_id.clone(),
            symbol: holding.symbol()?,
            name: holding.name.clone(),
            market_value: holding.market_value,
            origin: None,
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin.is_some()
    }

    /// Symbol shown as the "via" label: the mutual fund for synthetic
    /// positions, otherwise the ETF itself.
    pub fn label_symbol(&self) -> &str {
        self.origin
            .as_ref()
            .map(|o| o.symbol.as_str())
            .unwrap_or(&self.symbol)
    }

    pub fn label_name(&self) -> &str {
        self.origin
            .as_ref()
            .map(|o| o.name.as_str())
            .unwrap_or(&self.name)
    }
}

/// Translates mutual-fund holdings into synthetic ETF positions using the
/// static mapping catalog.
pub struct TranslationService;

impl TranslationService {
    pub fn new() -> Self {
        Self
    }

    /// One synthetic position per mapping row, in catalog row order.
    ///
    /// `value = fund value × percentage / 100`. Rows need not sum to 100%,
    /// so the synthesized total may fall short of the fund's value.
    pub fn translate(&self, holding: &Holding, catalogs: &Catalogs) -> Vec<EtfPosition> {
        let Some(symbol) = holding.symbol() else {
            return Vec::new();
        };
        let Some(fund) = catalogs.mutual_fund(&symbol) else {
            log::debug!("{symbol} is not in the mutual-fund catalog");
            return Vec::new();
        };

        fund.mappings
            .iter()
            .map(|mapping| EtfPosition {
                id: format!("{}::{}", holding.id, mapping.etf_symbol),
                account_id: holding.account_id.clone(),
                symbol: mapping.etf_symbol.clone(),
                name: catalogs
                    .etf_profile(&mapping.etf_symbol)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| mapping.etf_symbol.clone()),
                market_value: holding.market_value * mapping.percentage / 100.0,
                origin: Some(FundOrigin {
                    symbol: fund.symbol.clone(),
                    name: fund.name.clone(),
                    notes: mapping.notes.clone(),
                    percentage: mapping.percentage,
                }),
            })
            .collect()
    }

    /// Translate every mutual fund holding, preserving input order.
    pub fn translate_all(&self, holdings: &[&Holding], catalogs: &Catalogs) -> Vec<EtfPosition> {
        holdings
            .iter()
            .flat_map(|h| self.translate(h, catalogs))
            .collect()
    }
}

impl Default for TranslationService {
    fn default() -> Self {
        Self::new()
    }
}
