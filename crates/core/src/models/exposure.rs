use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::allocation::{AssetClassBucket, SectorBucket};
use super::etf::EtfProfile;

/// One wrapper's contribution to a ticker's exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureSource {
    /// The visible "via" label: the ETF held, or the mutual fund for
    /// synthetic positions
    pub origin_symbol: String,
    pub origin_name: String,
    /// ETF the value actually flowed through when the origin is a mutual fund
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_etf: Option<String>,
    /// Share of the origin position attributed to this ticker (percent)
    pub percent_of_origin: f64,
    pub value_via_origin: f64,
}

/// A display row under an exposure record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExposureSubRow {
    /// Value held directly in the ticker itself
    #[serde(rename_all = "camelCase")]
    Direct { value: f64, percent_of_portfolio: f64 },
    /// Value held through a wrapper
    #[serde(rename_all = "camelCase")]
    Via {
        origin_symbol: String,
        origin_name: String,
        via_etf: Option<String>,
        percent_of_origin: f64,
        value: f64,
        percent_of_portfolio: f64,
    },
}

impl ExposureSubRow {
    pub fn value(&self) -> f64 {
        match self {
            ExposureSubRow::Direct { value, .. } => *value,
            ExposureSubRow::Via { value, .. } => *value,
        }
    }
}

/// Aggregated exposure to a single underlying ticker.
///
/// `total_value` is always `direct_value + etf_value`; it is recomputed by
/// every mutation and never accumulated on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureRecord {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub direct_value: f64,
    pub etf_value: f64,
    pub total_value: f64,
    pub percent_of_portfolio: f64,
    pub sources: Vec<ExposureSource>,
    /// Filled in by finalization
    #[serde(default)]
    pub sub_rows: Vec<ExposureSubRow>,
}

impl ExposureRecord {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            sector: None,
            industry: None,
            direct_value: 0.0,
            etf_value: 0.0,
            total_value: 0.0,
            percent_of_portfolio: 0.0,
            sources: Vec::new(),
            sub_rows: Vec::new(),
        }
    }

    pub fn add_direct(&mut self, value: f64) {
        self.direct_value += value;
        self.recompute_total();
    }

    /// Add look-through value and record where it came from. Contributions
    /// from the same (origin, via) pair are merged into one source.
    pub fn add_via(&mut self, source: ExposureSource) {
        self.etf_value += source.value_via_origin;
        self.recompute_total();

        if let Some(existing) = self
            .sources
            .iter_mut()
            .find(|s| s.origin_symbol == source.origin_symbol && s.via_etf == source.via_etf)
        {
            existing.value_via_origin += source.value_via_origin;
        } else {
            self.sources.push(source);
        }
    }

    /// First non-empty classification wins; later ones are ignored.
    pub fn classify(&mut self, sector: Option<&str>, industry: Option<&str>) {
        if self.sector.is_none() {
            if let Some(s) = sector.filter(|s| !s.trim().is_empty()) {
                self.sector = Some(s.to_string());
            }
        }
        if self.industry.is_none() {
            if let Some(i) = industry.filter(|i| !i.trim().is_empty()) {
                self.industry = Some(i.to_string());
            }
        }
    }

    fn recompute_total(&mut self) {
        self.total_value = self.direct_value + self.etf_value;
    }
}

/// Everything one pipeline run produces. Recomputed from scratch per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureReport {
    /// Sorted descending by `total_value`
    pub exposure_records: Vec<ExposureRecord>,

    /// Σ market value of every input holding, cash included
    pub total_portfolio_value: f64,

    /// Wrapper-level allocation, sorted descending
    pub asset_class_breakdown: Vec<AssetClassBucket>,

    /// Look-through allocation by sector, sorted descending
    pub sector_breakdown: Vec<SectorBucket>,

    /// ETF profiles that contributed constituents, keyed by symbol
    pub resolved_profiles: BTreeMap<String, EtfProfile>,

    pub calculated_at: DateTime<Utc>,
}

impl ExposureReport {
    /// Find the record for a ticker (case-insensitive).
    pub fn record(&self, ticker: &str) -> Option<&ExposureRecord> {
        let upper = ticker.trim().to_uppercase();
        self.exposure_records.iter().find(|r| r.ticker == upper)
    }

    /// Σ look-through value across all records. Lower than the portfolio
    /// total whenever cash, unresolved funds or unlisted constituents exist.
    pub fn total_exposure_value(&self) -> f64 {
        self.exposure_records.iter().map(|r| r.total_value).sum()
    }
}
