use serde::{Deserialize, Serialize};

/// Sector / industry classification of a single ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorInfo {
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl SectorInfo {
    pub fn new(sector: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            industry: None,
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }
}
