//! Static, versioned reference data consumed by the pipeline.
//!
//! Catalogs are validated once when loaded; lookups never fail.

pub mod format;
pub mod loader;

use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::allocation::{AssetClassDefinition, AssetClassWeight};
use crate::models::etf::EtfProfile;
use crate::models::holding::normalize_symbol;
use crate::models::mutual_fund::{MutualFundEntry, MutualFundMapping};
use crate::models::sector::SectorInfo;

use loader::CatalogLoader;

const BUILTIN_ETF_CONSTITUENTS: &str = include_str!("../../data/etf_constituents.json");
const BUILTIN_MUTUAL_FUNDS: &str = include_str!("../../data/mutual_funds.json");
const BUILTIN_ASSET_CLASSES: &str = include_str!("../../data/asset_classes.json");
const BUILTIN_SECTORS: &str = include_str!("../../data/sectors.json");

/// The four lookup tables, keyed by uppercase symbol.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub(crate) etfs: HashMap<String, EtfProfile>,
    pub(crate) mutual_funds: HashMap<String, MutualFundEntry>,
    pub(crate) stock_classes: HashMap<String, String>,
    pub(crate) etf_classes: HashMap<String, Vec<AssetClassWeight>>,
    pub(crate) asset_classes: HashMap<String, AssetClassDefinition>,
    pub(crate) sectors: HashMap<String, SectorInfo>,
}

impl Catalogs {
    /// No data at all. Every ETF is a miss, every sector is unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog set shipped with the crate.
    pub fn builtin() -> Result<Self, CoreError> {
        CatalogLoader::load_from_bytes(
            BUILTIN_ETF_CONSTITUENTS.as_bytes(),
            BUILTIN_MUTUAL_FUNDS.as_bytes(),
            BUILTIN_ASSET_CLASSES.as_bytes(),
            BUILTIN_SECTORS.as_bytes(),
        )
    }

    // ── Lookups ─────────────────────────────────────────────────────

    pub fn etf_profile(&self, symbol: &str) -> Option<&EtfProfile> {
        self.etfs.get(&symbol.to_uppercase())
    }

    pub fn mutual_fund(&self, symbol: &str) -> Option<&MutualFundEntry> {
        self.mutual_funds.get(&symbol.to_uppercase())
    }

    pub fn is_mutual_fund(&self, symbol: &str) -> bool {
        self.mutual_funds.contains_key(&symbol.to_uppercase())
    }

    pub fn stock_class(&self, symbol: &str) -> Option<&str> {
        self.stock_classes
            .get(&symbol.to_uppercase())
            .map(String::as_str)
    }

    pub fn etf_classes(&self, symbol: &str) -> Option<&[AssetClassWeight]> {
        self.etf_classes
            .get(&symbol.to_uppercase())
            .map(Vec::as_slice)
    }

    /// Display name for a class id. Undeclared classes display their id.
    pub fn asset_class_name(&self, class_id: &str) -> String {
        self.asset_classes
            .get(class_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| class_id.to_string())
    }

    pub fn asset_class(&self, class_id: &str) -> Option<&AssetClassDefinition> {
        self.asset_classes.get(class_id)
    }

    pub fn sector(&self, symbol: &str) -> Option<&SectorInfo> {
        self.sectors.get(&symbol.to_uppercase())
    }

    pub fn etf_count(&self) -> usize {
        self.etfs.len()
    }

    pub fn mutual_fund_count(&self) -> usize {
        self.mutual_funds.len()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    // ── Programmatic construction ───────────────────────────────────
    //
    // These skip document validation; callers building catalogs in code
    // own the data quality.

    pub fn with_etf(mut self, profile: EtfProfile) -> Self {
        self.etfs.insert(profile.symbol.to_uppercase(), profile);
        self
    }

    /// Add a mutual fund mapped onto `(etf, percentage)` rows. Rows naming
    /// the same ETF are merged into one.
    pub fn with_mutual_fund(mut self, symbol: &str, name: &str, rows: &[(&str, f64)]) -> Self {
        let Some(fund) = normalize_symbol(symbol) else {
            return self;
        };
        let mut mappings: Vec<MutualFundMapping> = Vec::with_capacity(rows.len());
        for (etf, percentage) in rows {
            let Some(etf_symbol) = normalize_symbol(etf) else {
                continue;
            };
            match mappings.iter_mut().find(|m| m.etf_symbol == etf_symbol) {
                Some(existing) => existing.percentage += percentage,
                None => mappings.push(MutualFundMapping {
                    mutual_fund_symbol: fund.clone(),
                    etf_symbol,
                    percentage: *percentage,
                    notes: String::new(),
                }),
            }
        }
        self.mutual_funds.insert(
            fund.clone(),
            MutualFundEntry {
                symbol: fund,
                name: name.to_string(),
                mappings,
            },
        );
        self
    }

    pub fn with_stock_class(mut self, symbol: &str, class_id: &str) -> Self {
        self.stock_classes
            .insert(symbol.to_uppercase(), class_id.to_string());
        self
    }

    pub fn with_etf_classes(mut self, symbol: &str, weights: &[(&str, f64)]) -> Self {
        let weights = weights
            .iter()
            .map(|(class_id, percentage)| AssetClassWeight {
                class_id: class_id.to_string(),
                percentage: *percentage,
            })
            .collect();
        self.etf_classes.insert(symbol.to_uppercase(), weights);
        self
    }

    pub fn with_asset_class(mut self, class_id: &str, name: &str, color: &str) -> Self {
        self.asset_classes.insert(
            class_id.to_string(),
            AssetClassDefinition {
                name: name.to_string(),
                color: color.to_string(),
            },
        );
        self
    }

    pub fn with_sector(mut self, symbol: &str, info: SectorInfo) -> Self {
        self.sectors.insert(symbol.to_uppercase(), info);
        self
    }
}
