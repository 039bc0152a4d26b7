use serde::{Deserialize, Serialize};

/// One underlying security held by an ETF.
///
/// Weights are percentages (6.5 = 6.5%) and need not sum to 100 across a
/// profile: catalogs usually list only the top holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfConstituent {
    pub symbol: String,
    pub name: String,
    pub weight_percent: f64,
    /// Sector hint shipped with the constituent data, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl EtfConstituent {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, weight_percent: f64) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: name.into(),
            weight_percent,
            sector: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// The resolved holdings of one ETF. Cached by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfProfile {
    pub symbol: String,
    pub name: String,
    pub constituents: Vec<EtfConstituent>,
}

impl EtfProfile {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        constituents: Vec<EtfConstituent>,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: name.into(),
            constituents,
        }
    }

    /// Sum of listed constituent weights. Anything below 100 is the
    /// unlisted tail that contributes no look-through exposure.
    pub fn listed_weight(&self) -> f64 {
        self.constituents.iter().map(|c| c.weight_percent).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }
}
