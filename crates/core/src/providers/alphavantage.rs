use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::etf::{EtfConstituent, EtfProfile};
use crate::models::sector::SectorInfo;
use super::traits::{LookupKind, ReferenceDataProvider};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_NAME: &str = "Alpha Vantage";

/// Alpha Vantage API provider for ETF holdings and company fundamentals.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Endpoints**: `ETF_PROFILE` (holdings, weights as fractions) and
///   `OVERVIEW` (sector / industry).
///
/// Alpha Vantage has no batch endpoint, so a batch is served by issuing one
/// request per symbol concurrently.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    /// Convert an `ETF_PROFILE` response body into a profile.
    /// `Ok(None)` when the response carries no holdings (unknown symbol).
    /// The endpoint returns no fund name, so the profile is named by ticker.
    pub fn parse_etf_profile(symbol: &str, body: &str) -> Result<Option<EtfProfile>, CoreError> {
        let resp: EtfProfileResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: format!("Failed to parse ETF profile for {symbol}: {e}"),
        })?;
        if let Some(message) = resp.rate_limit_message() {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("No ETF profile for {symbol}: {message}"),
            });
        }

        let constituents: Vec<EtfConstituent> = resp
            .holdings
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| {
                let weight: f64 = h.weight.parse().ok()?;
                let constituent_symbol = h.symbol.trim().to_uppercase();
                if constituent_symbol.is_empty() || constituent_symbol == "N/A" || !weight.is_finite() {
                    return None;
                }
                // Alpha Vantage weights are fractions (0.0914 = 9.14%)
                Some(EtfConstituent::new(constituent_symbol, h.description, weight * 100.0))
            })
            .collect();

        if constituents.is_empty() {
            return Ok(None);
        }
        Ok(Some(EtfProfile::new(symbol, symbol, constituents)))
    }

    /// Convert an `OVERVIEW` response body into sector / industry.
    /// `Ok(None)` for unknown symbols and for "None" placeholders.
    pub fn parse_company_overview(symbol: &str, body: &str) -> Result<Option<SectorInfo>, CoreError> {
        let resp: OverviewResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: format!("Failed to parse overview for {symbol}: {e}"),
        })?;
        if let Some(message) = resp.note.or(resp.information) {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("No overview for {symbol}: {message}"),
            });
        }

        let Some(sector) = resp.sector.as_deref().and_then(meaningful) else {
            return Ok(None);
        };
        let mut info = SectorInfo::new(title_case(sector));
        if let Some(industry) = resp.industry.as_deref().and_then(meaningful) {
            info = info.with_industry(title_case(industry));
        }
        Ok(Some(info))
    }

    async fn fetch(&self, function: &str, symbol: &str) -> Result<String, CoreError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", function),
                ("symbol", &symbol.to_uppercase()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("{function} for {symbol} returned HTTP {}", resp.status()),
            });
        }
        Ok(resp.text().await?)
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct EtfProfileResponse {
    holdings: Option<Vec<EtfHolding>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl EtfProfileResponse {
    fn rate_limit_message(&self) -> Option<&str> {
        self.note.as_deref().or(self.information.as_deref())
    }
}

#[derive(Deserialize)]
struct EtfHolding {
    symbol: String,
    #[serde(default)]
    description: String,
    weight: String,
}

#[derive(Deserialize)]
struct OverviewResponse {
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReferenceDataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn supported_lookups(&self) -> Vec<LookupKind> {
        vec![LookupKind::EtfHoldings, LookupKind::CompanyOverview]
    }

    async fn get_etf_profiles(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, EtfProfile>, CoreError> {
        let requests = symbols.iter().map(|symbol| async move {
            let body = self.fetch("ETF_PROFILE", symbol).await?;
            Self::parse_etf_profile(symbol, &body).map(|p| (symbol.clone(), p))
        });
        collect_partial(join_all(requests).await)
    }

    async fn get_company_overviews(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SectorInfo>, CoreError> {
        let requests = symbols.iter().map(|symbol| async move {
            let body = self.fetch("OVERVIEW", symbol).await?;
            Self::parse_company_overview(symbol, &body).map(|i| (symbol.clone(), i))
        });
        collect_partial(join_all(requests).await)
    }
}

/// Keep every per-symbol success. The batch only fails when no request
/// succeeded and at least one errored.
fn collect_partial<V>(
    results: Vec<Result<(String, Option<V>), CoreError>>,
) -> Result<HashMap<String, V>, CoreError> {
    let mut resolved = HashMap::new();
    let mut any_ok = false;
    let mut last_error = None;

    for result in results {
        match result {
            Ok((symbol, value)) => {
                any_ok = true;
                if let Some(value) = value {
                    resolved.insert(symbol, value);
                }
            }
            Err(e) => {
                log::debug!("{PROVIDER_NAME} request failed: {e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_ok => Err(e),
        _ => Ok(resolved),
    }
}

fn meaningful(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed == "-" {
        None
    } else {
        Some(trimmed)
    }
}

/// "COMPUTER & OFFICE EQUIPMENT" → "Computer & Office Equipment"
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
