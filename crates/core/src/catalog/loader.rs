use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::allocation::{AssetClassDefinition, AssetClassWeight};
use crate::models::etf::{EtfConstituent, EtfProfile};
use crate::models::holding::normalize_symbol;
use crate::models::mutual_fund::{MutualFundEntry, MutualFundMapping};
use crate::models::sector::SectorInfo;

use super::format::{
    self, AssetClassCatalogDocument, CatalogKind, EtfCatalogDocument, MutualFundCatalogDocument,
    SectorCatalogDocument,
};
use super::Catalogs;

/// Tolerance for "sums to 100" checks, in percentage points.
const SUM_TOLERANCE: f64 = 0.5;

/// File names expected by `load_from_dir`.
pub const ETF_CONSTITUENTS_FILE: &str = "etf_constituents.json";
pub const MUTUAL_FUNDS_FILE: &str = "mutual_funds.json";
pub const ASSET_CLASSES_FILE: &str = "asset_classes.json";
pub const SECTORS_FILE: &str = "sectors.json";

/// Loads and validates catalog documents.
///
/// Every document is checked up front so that malformed entries fail the
/// load instead of surfacing later as odd lookup results.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse and validate all four documents from raw JSON bytes.
    pub fn load_from_bytes(
        etf_constituents: &[u8],
        mutual_funds: &[u8],
        asset_classes: &[u8],
        sectors: &[u8],
    ) -> Result<Catalogs, CoreError> {
        let etfs = Self::parse_etf_constituents(etf_constituents)?;
        let mutual_funds = Self::parse_mutual_funds(mutual_funds)?;
        let (stock_classes, etf_classes, asset_classes) = Self::parse_asset_classes(asset_classes)?;
        let sectors = Self::parse_sectors(sectors)?;

        log::info!(
            "Loaded catalogs: {} ETFs, {} mutual funds, {} asset classes, {} sector entries",
            etfs.len(),
            mutual_funds.len(),
            asset_classes.len(),
            sectors.len()
        );

        Ok(Catalogs {
            etfs,
            mutual_funds,
            stock_classes,
            etf_classes,
            asset_classes,
            sectors,
        })
    }

    /// Load the four documents from a directory (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_dir(dir: impl AsRef<std::path::Path>) -> Result<Catalogs, CoreError> {
        let dir = dir.as_ref();
        let etf_constituents = std::fs::read(dir.join(ETF_CONSTITUENTS_FILE))?;
        let mutual_funds = std::fs::read(dir.join(MUTUAL_FUNDS_FILE))?;
        let asset_classes = std::fs::read(dir.join(ASSET_CLASSES_FILE))?;
        let sectors = std::fs::read(dir.join(SECTORS_FILE))?;
        Self::load_from_bytes(&etf_constituents, &mutual_funds, &asset_classes, &sectors)
    }

    pub fn parse_etf_constituents(data: &[u8]) -> Result<HashMap<String, EtfProfile>, CoreError> {
        let kind = CatalogKind::EtfConstituents;
        let doc: EtfCatalogDocument = format::parse_document(kind, data)?;
        format::check_version(kind, doc.version)?;

        let mut etfs = HashMap::with_capacity(doc.etfs.len());
        for (raw_symbol, entry) in doc.etfs {
            let symbol = required_symbol(kind, &raw_symbol, "ETF")?;

            let mut constituents = Vec::with_capacity(entry.constituents.len());
            for c in entry.constituents {
                let constituent_symbol = required_symbol(kind, &c.symbol, &symbol)?;
                check_percentage(kind, &format!("{symbol}/{constituent_symbol} weight"), c.weight_percent)?;
                if constituents.iter().any(|e: &EtfConstituent| e.symbol == constituent_symbol) {
                    return Err(CoreError::InvalidCatalog(format!(
                        "{kind} catalog: {symbol} lists {constituent_symbol} more than once"
                    )));
                }
                constituents.push(EtfConstituent {
                    symbol: constituent_symbol,
                    name: c.name,
                    weight_percent: c.weight_percent,
                    sector: c.sector.filter(|s| !s.trim().is_empty()),
                });
            }

            let profile = EtfProfile {
                symbol: symbol.clone(),
                name: entry.name,
                constituents,
            };
            if profile.listed_weight() > 100.0 + SUM_TOLERANCE {
                return Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {symbol} constituent weights sum to {:.2}%, more than 100%",
                    profile.listed_weight()
                )));
            }
            insert_unique(kind, &mut etfs, symbol, profile)?;
        }
        Ok(etfs)
    }

    pub fn parse_mutual_funds(data: &[u8]) -> Result<HashMap<String, MutualFundEntry>, CoreError> {
        let kind = CatalogKind::MutualFunds;
        let doc: MutualFundCatalogDocument = format::parse_document(kind, data)?;
        format::check_version(kind, doc.version)?;

        let mut funds = HashMap::with_capacity(doc.funds.len());
        for (raw_symbol, entry) in doc.funds {
            let symbol = required_symbol(kind, &raw_symbol, "fund")?;
            if entry.mappings.is_empty() {
                return Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {symbol} has no mapping rows"
                )));
            }

            let mut mappings = Vec::with_capacity(entry.mappings.len());
            for row in entry.mappings {
                let etf_symbol = required_symbol(kind, &row.etf, &symbol)?;
                check_percentage(kind, &format!("{symbol}->{etf_symbol} percentage"), row.percentage)?;
                if mappings.iter().any(|m: &MutualFundMapping| m.etf_symbol == etf_symbol) {
                    return Err(CoreError::InvalidCatalog(format!(
                        "{kind} catalog: {symbol} maps {etf_symbol} more than once"
                    )));
                }
                mappings.push(MutualFundMapping {
                    mutual_fund_symbol: symbol.clone(),
                    etf_symbol,
                    percentage: row.percentage,
                    notes: row.notes,
                });
            }

            let fund = MutualFundEntry {
                symbol: symbol.clone(),
                name: entry.name,
                mappings,
            };
            let mapped = fund.mapped_percentage();
            if (mapped - 100.0).abs() > SUM_TOLERANCE {
                log::warn!(
                    "Mutual fund {symbol} maps {mapped:.2}% of its value; accepting as an approximation"
                );
            }
            insert_unique(kind, &mut funds, symbol, fund)?;
        }
        Ok(funds)
    }

    #[allow(clippy::type_complexity)]
    pub fn parse_asset_classes(
        data: &[u8],
    ) -> Result<
        (
            HashMap<String, String>,
            HashMap<String, Vec<AssetClassWeight>>,
            HashMap<String, AssetClassDefinition>,
        ),
        CoreError,
    > {
        let kind = CatalogKind::AssetClasses;
        let doc: AssetClassCatalogDocument = format::parse_document(kind, data)?;
        format::check_version(kind, doc.version)?;

        let asset_classes: HashMap<String, AssetClassDefinition> =
            doc.asset_classes.into_iter().collect();
        let declared = |class_id: &str, context: &str| -> Result<(), CoreError> {
            if asset_classes.contains_key(class_id) {
                Ok(())
            } else {
                Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {context} references undeclared class '{class_id}'"
                )))
            }
        };

        let mut stock_classes = HashMap::with_capacity(doc.stocks.len());
        for (raw_symbol, class_id) in doc.stocks {
            let symbol = required_symbol(kind, &raw_symbol, "stock")?;
            declared(&class_id, &symbol)?;
            insert_unique(kind, &mut stock_classes, symbol, class_id)?;
        }

        let mut etf_classes = HashMap::with_capacity(doc.etfs.len());
        for (raw_symbol, weights) in doc.etfs {
            let symbol = required_symbol(kind, &raw_symbol, "ETF")?;
            if weights.is_empty() {
                return Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {symbol} has an empty class breakdown"
                )));
            }
            for w in &weights {
                declared(&w.class_id, &symbol)?;
                check_percentage(kind, &format!("{symbol}/{} percentage", w.class_id), w.percentage)?;
            }
            let sum: f64 = weights.iter().map(|w| w.percentage).sum();
            if (sum - 100.0).abs() > SUM_TOLERANCE {
                return Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {symbol} class breakdown sums to {sum:.2}%, expected 100%"
                )));
            }
            insert_unique(kind, &mut etf_classes, symbol, weights)?;
        }

        Ok((stock_classes, etf_classes, asset_classes))
    }

    pub fn parse_sectors(data: &[u8]) -> Result<HashMap<String, SectorInfo>, CoreError> {
        let kind = CatalogKind::Sectors;
        let doc: SectorCatalogDocument = format::parse_document(kind, data)?;
        format::check_version(kind, doc.version)?;

        let mut sectors = HashMap::with_capacity(doc.tickers.len());
        for (raw_symbol, info) in doc.tickers {
            let symbol = required_symbol(kind, &raw_symbol, "ticker")?;
            if info.sector.trim().is_empty() {
                return Err(CoreError::InvalidCatalog(format!(
                    "{kind} catalog: {symbol} has an empty sector"
                )));
            }
            let info = SectorInfo {
                sector: info.sector.trim().to_string(),
                industry: info.industry.filter(|i| !i.trim().is_empty()),
            };
            insert_unique(kind, &mut sectors, symbol, info)?;
        }
        Ok(sectors)
    }
}

fn required_symbol(kind: CatalogKind, raw: &str, context: &str) -> Result<String, CoreError> {
    normalize_symbol(raw).ok_or_else(|| {
        CoreError::InvalidCatalog(format!("{kind} catalog: empty symbol under {context}"))
    })
}

fn check_percentage(kind: CatalogKind, context: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CoreError::InvalidCatalog(format!(
            "{kind} catalog: {context} out of range: {value} (expected 0..100)"
        )));
    }
    Ok(())
}

/// Keys differing only by case collapse to the same symbol; that is a
/// catalog bug, not something to silently overwrite.
fn insert_unique<V>(
    kind: CatalogKind,
    map: &mut HashMap<String, V>,
    symbol: String,
    value: V,
) -> Result<(), CoreError> {
    if map.contains_key(&symbol) {
        return Err(CoreError::InvalidCatalog(format!(
            "{kind} catalog: duplicate entry for {symbol}"
        )));
    }
    map.insert(symbol, value);
    Ok(())
}
