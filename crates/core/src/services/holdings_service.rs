use crate::catalog::Catalogs;
use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingType};

/// Raw holdings split by how the pipeline treats them.
/// Every bucket keeps the caller's input order.
#[derive(Debug, Default)]
pub struct CategorizedHoldings<'a> {
    /// Stocks: direct exposure
    pub direct: Vec<&'a Holding>,
    /// Funds not in the mutual-fund catalog, resolved as ETFs
    pub etfs: Vec<&'a Holding>,
    /// Funds translated through the mutual-fund catalog
    pub mutual_funds: Vec<&'a Holding>,
    /// Cash: no exposure, counts toward totals and the cash class
    pub cash: Vec<&'a Holding>,
    /// Stocks and funds without a ticker: no exposure, but still counted
    pub unidentified: Vec<&'a Holding>,
}

impl CategorizedHoldings<'_> {
    pub fn len(&self) -> usize {
        self.direct.len()
            + self.etfs.len()
            + self.mutual_funds.len()
            + self.cash.len()
            + self.unidentified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validates and categorizes raw holdings.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Reject holdings the arithmetic cannot work with.
    pub fn validate(&self, holdings: &[Holding]) -> Result<(), CoreError> {
        for holding in holdings {
            if !holding.market_value.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "Holding {} has a non-finite market value: {}",
                    holding.id, holding.market_value
                )));
            }
        }
        Ok(())
    }

    /// Σ market value of every holding, cash included.
    pub fn total_value(&self, holdings: &[Holding]) -> f64 {
        holdings.iter().map(|h| h.market_value).sum()
    }

    /// Route each holding to its bucket.
    ///
    /// Fund tickers found in the mutual-fund catalog are mutual funds; every
    /// other fund is treated as an ETF, and unknown ETFs later resolve to
    /// no constituents.
    pub fn categorize<'a>(&self, holdings: &'a [Holding], catalogs: &Catalogs) -> CategorizedHoldings<'a> {
        let mut categorized = CategorizedHoldings::default();

        for holding in holdings {
            match (holding.holding_type, holding.symbol()) {
                (HoldingType::Cash, _) => categorized.cash.push(holding),
                (_, None) => {
                    log::debug!(
                        "Holding {} ({}) has no ticker; excluded from exposure",
                        holding.id,
                        holding.holding_type
                    );
                    categorized.unidentified.push(holding);
                }
                (HoldingType::Stock, Some(_)) => categorized.direct.push(holding),
                (HoldingType::Fund, Some(symbol)) => {
                    if catalogs.is_mutual_fund(&symbol) {
                        categorized.mutual_funds.push(holding);
                    } else {
                        categorized.etfs.push(holding);
                    }
                }
            }
        }

        categorized
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
