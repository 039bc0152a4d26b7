use serde::{Deserialize, Serialize};

/// One row of a mutual fund's static ETF approximation:
/// "`percentage`% of `mutual_fund_symbol` behaves like `etf_symbol`".
///
/// Percentages per fund are not required to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualFundMapping {
    pub mutual_fund_symbol: String,
    pub etf_symbol: String,
    pub percentage: f64,
    #[serde(default)]
    pub notes: String,
}

/// A fund-level entry of the mutual-fund catalog: display name plus all
/// of its mapping rows, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualFundEntry {
    pub symbol: String,
    pub name: String,
    pub mappings: Vec<MutualFundMapping>,
}

impl MutualFundEntry {
    /// Σ mapped percentages. Deviations from 100 are an accepted approximation.
    pub fn mapped_percentage(&self) -> f64 {
        self.mappings.iter().map(|m| m.percentage).sum()
    }
}
