use serde::{Deserialize, Serialize};

/// The kind of position a holding represents.
/// Determines which pipeline stage the holding is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingType {
    /// Individual stock (AAPL, MSFT, etc.): direct exposure
    Stock,
    /// ETF or mutual fund: look-through exposure via constituents
    Fund,
    /// Cash balance: no ticker, no exposure, counts toward total value
    Cash,
}

impl std::fmt::Display for HoldingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldingType::Stock => write!(f, "stock"),
            HoldingType::Fund => write!(f, "fund"),
            HoldingType::Cash => write!(f, "cash"),
        }
    }
}

/// A single position in one account, as supplied by the caller.
///
/// `market_value` is already computed upstream; the engine never looks up
/// prices and never mutates holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Caller-assigned identifier
    pub id: String,

    /// Owning account
    pub account_id: String,

    /// Ticker symbol, uppercased. `None` for cash.
    pub ticker: Option<String>,

    /// Display name (e.g., "Apple Inc.", "Vanguard Total Stock Market ETF")
    pub name: String,

    pub quantity: f64,

    pub last_price: f64,

    /// Current value of the position in the display currency
    pub market_value: f64,

    #[serde(rename = "type")]
    pub holding_type: HoldingType,
}

impl Holding {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        ticker: Option<&str>,
        name: impl Into<String>,
        quantity: f64,
        last_price: f64,
        market_value: f64,
        holding_type: HoldingType,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            ticker: ticker.and_then(normalize_symbol),
            name: name.into(),
            quantity,
            last_price,
            market_value,
            holding_type,
        }
    }

    /// Convenience constructors for tests and simple callers.
    /// Quantity and price are derived as `1 × market_value`.
    pub fn stock(id: impl Into<String>, ticker: &str, market_value: f64) -> Self {
        Self::new(id, "default", Some(ticker), ticker, 1.0, market_value, market_value, HoldingType::Stock)
    }

    pub fn fund(id: impl Into<String>, ticker: &str, market_value: f64) -> Self {
        Self::new(id, "default", Some(ticker), ticker, 1.0, market_value, market_value, HoldingType::Fund)
    }

    pub fn cash(id: impl Into<String>, market_value: f64) -> Self {
        Self::new(id, "default", None, "Cash", market_value, 1.0, market_value, HoldingType::Cash)
    }

    /// Move this holding into another account.
    pub fn in_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// The normalized ticker, or `None` for cash and blank tickers.
    ///
    /// Holdings deserialized from callers may carry lowercase or padded
    /// tickers, so lookups always go through this accessor.
    pub fn symbol(&self) -> Option<String> {
        self.ticker.as_deref().and_then(normalize_symbol)
    }
}

/// Trim and uppercase a ticker. Blank input yields `None`.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
