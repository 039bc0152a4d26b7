use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Asset class every unclassified dollar falls back to.
pub const DEFAULT_ASSET_CLASS: &str = "us_equity";

/// Asset class receiving cash holdings.
pub const CASH_ASSET_CLASS: &str = "cash";

/// Sector label for exposure with no resolved sector.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// How resolvers combine the static catalogs with network providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Cache and catalog only. Never touches the network.
    StaticOnly,
    /// Cache, then catalog, then one batch network call for the misses.
    #[default]
    FillMisses,
    /// Cache, then one batch network call for every uncached symbol.
    /// Network answers override the catalog; the catalog fills the gaps.
    PreferNetwork,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub resolution_policy: ResolutionPolicy,

    /// Per-request timeout applied to every provider HTTP client.
    pub network_timeout_secs: u64,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,

    /// Base URL of a batch reference-data endpoint, if one is deployed.
    pub batch_endpoint: Option<String>,

    /// Maximum symbols per batch request.
    pub max_batch_size: usize,

    pub unknown_sector_label: String,

    pub default_asset_class: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            resolution_policy: ResolutionPolicy::default(),
            network_timeout_secs: 15,
            api_keys: HashMap::new(),
            batch_endpoint: None,
            max_batch_size: 100,
            unknown_sector_label: UNKNOWN_SECTOR.to_string(),
            default_asset_class: DEFAULT_ASSET_CLASS.to_string(),
        }
    }
}

impl EngineSettings {
    /// Settings that never reach the network.
    pub fn offline() -> Self {
        Self {
            resolution_policy: ResolutionPolicy::StaticOnly,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_batch_size == 0 {
            return Err(CoreError::ValidationError(
                "max_batch_size must be at least 1".into(),
            ));
        }
        if self.network_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "network_timeout_secs must be at least 1".into(),
            ));
        }
        if self.default_asset_class.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "default_asset_class must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn network_enabled(&self) -> bool {
        self.resolution_policy != ResolutionPolicy::StaticOnly
    }
}
