use serde::{Deserialize, Serialize};

/// Wrapper-level allocation to one asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassBucket {
    pub class_id: String,
    pub display_name: String,
    pub market_value: f64,
    pub percentage: f64,
}

/// Look-through allocation to one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBucket {
    pub sector_name: String,
    pub market_value: f64,
    pub percentage: f64,
}

/// Share of an ETF allocated to an asset class (catalog data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClassWeight {
    #[serde(rename = "class")]
    pub class_id: String,
    pub percentage: f64,
}

/// Display metadata of an asset class (catalog data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetClassDefinition {
    pub name: String,
    #[serde(default)]
    pub color: String,
}
