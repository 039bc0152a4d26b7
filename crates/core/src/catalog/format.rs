use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::allocation::{AssetClassDefinition, AssetClassWeight};
use crate::models::etf::EtfConstituent;
use crate::models::sector::SectorInfo;

/// Current catalog document version.
pub const CURRENT_VERSION: u32 = 1;

/// Which of the four catalog documents is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    EtfConstituents,
    MutualFunds,
    AssetClasses,
    Sectors,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::EtfConstituents => write!(f, "ETF constituents"),
            CatalogKind::MutualFunds => write!(f, "mutual fund"),
            CatalogKind::AssetClasses => write!(f, "asset class"),
            CatalogKind::Sectors => write!(f, "sector"),
        }
    }
}

/// `{ "version": 1, "etfs": { "VTI": { "name": ..., "constituents": [...] } } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtfCatalogDocument {
    pub version: u32,
    #[serde(default)]
    pub etfs: BTreeMap<String, EtfDocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtfDocumentEntry {
    pub name: String,
    #[serde(default)]
    pub constituents: Vec<EtfConstituent>,
}

/// `{ "version": 1, "funds": { "VFIFX": { "name": ..., "mappings": [...] } } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualFundCatalogDocument {
    pub version: u32,
    #[serde(default)]
    pub funds: BTreeMap<String, MutualFundDocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualFundDocumentEntry {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<MappingRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRow {
    pub etf: String,
    pub percentage: f64,
    #[serde(default)]
    pub notes: String,
}

/// `{ "version": 1, "stocks": {..}, "etfs": {..}, "assetClasses": {..} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassCatalogDocument {
    pub version: u32,
    #[serde(default)]
    pub stocks: BTreeMap<String, String>,
    #[serde(default)]
    pub etfs: BTreeMap<String, Vec<AssetClassWeight>>,
    #[serde(default)]
    pub asset_classes: BTreeMap<String, AssetClassDefinition>,
}

/// `{ "version": 1, "tickers": { "AAPL": { "sector": ..., "industry": ... } } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorCatalogDocument {
    pub version: u32,
    #[serde(default)]
    pub tickers: BTreeMap<String, SectorInfo>,
}

/// Reject versions this build does not understand.
pub fn check_version(kind: CatalogKind, version: u32) -> Result<(), CoreError> {
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedCatalogVersion {
            kind: kind.to_string(),
            version,
        });
    }
    Ok(())
}

/// Parse a JSON catalog document, tagging parse failures with the catalog kind.
pub fn parse_document<T: serde::de::DeserializeOwned>(
    kind: CatalogKind,
    data: &[u8],
) -> Result<T, CoreError> {
    serde_json::from_slice(data).map_err(|e| {
        CoreError::InvalidCatalog(format!("Failed to parse {kind} catalog: {e}"))
    })
}
