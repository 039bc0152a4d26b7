use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::etf::{EtfConstituent, EtfProfile};
use crate::models::holding::normalize_symbol;
use crate::models::sector::SectorInfo;
use super::traits::{LookupKind, ReferenceDataProvider};

const PROVIDER_NAME: &str = "Batch endpoint";

/// Provider for a self-hosted batch reference-data endpoint.
///
/// - `POST {base}/etf-holdings` with `{"symbols": [...]}` →
///   `{"results": {"VTI": {"name": ..., "constituents": [...]}}}`
/// - `POST {base}/company-overview` with `{"symbols": [...]}` →
///   `{"results": {"AAPL": {"sector": ..., "industry": ...}}}`
///
/// Symbol sets larger than `max_batch_size` are split into chunks.
pub struct BatchHttpProvider {
    client: Client,
    base_url: String,
    max_batch_size: usize,
}

impl BatchHttpProvider {
    pub fn new(base_url: String, timeout_secs: u64, max_batch_size: usize) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Split a symbol set into request-sized chunks.
    pub fn chunk<'a>(&self, symbols: &'a [String]) -> Vec<&'a [String]> {
        symbols.chunks(self.max_batch_size).collect()
    }

    /// Convert an `/etf-holdings` response body into profiles.
    pub fn parse_etf_holdings(body: &str) -> Result<HashMap<String, EtfProfile>, CoreError> {
        let resp: BatchResponse<HoldingsEntry> =
            serde_json::from_str(body).map_err(|e| CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("Failed to parse ETF holdings response: {e}"),
            })?;

        Ok(resp
            .results
            .into_iter()
            .filter_map(|(symbol, entry)| {
                let constituents: Vec<EtfConstituent> = entry
                    .constituents
                    .into_iter()
                    .filter(|c| !c.symbol.trim().is_empty() && c.weight_percent.is_finite())
                    .map(|c| EtfConstituent {
                        symbol: c.symbol.trim().to_uppercase(),
                        ..c
                    })
                    .collect();
                let symbol = symbol.trim().to_uppercase();
                if symbol.is_empty() {
                    return None;
                }
                let name = entry.name.unwrap_or_else(|| symbol.clone());
                Some((symbol.clone(), EtfProfile::new(symbol, name, constituents)))
            })
            .collect())
    }

    /// Convert a `/company-overview` response body into sector data.
    pub fn parse_company_overviews(body: &str) -> Result<HashMap<String, SectorInfo>, CoreError> {
        let resp: BatchResponse<SectorInfo> =
            serde_json::from_str(body).map_err(|e| CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("Failed to parse company overview response: {e}"),
            })?;

        Ok(resp
            .results
            .into_iter()
            .filter_map(|(symbol, info)| {
                let symbol = normalize_symbol(&symbol)?;
                let sector = info.sector.trim();
                if sector.is_empty() {
                    return None;
                }
                let info = SectorInfo {
                    sector: sector.to_string(),
                    industry: info
                        .industry
                        .map(|i| i.trim().to_string())
                        .filter(|i| !i.is_empty()),
                };
                Some((symbol, info))
            })
            .collect())
    }

    async fn post(&self, path: &str, symbols: &[String]) -> Result<String, CoreError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&BatchRequest { symbols })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("{path} returned HTTP {}", resp.status()),
            });
        }
        Ok(resp.text().await?)
    }

    async fn fetch_all<V: Send>(
        &self,
        path: &str,
        symbols: &[String],
        parse: fn(&str) -> Result<HashMap<String, V>, CoreError>,
    ) -> Result<HashMap<String, V>, CoreError> {
        let requests = self.chunk(symbols).into_iter().map(|chunk| async move {
            let body = self.post(path, chunk).await?;
            parse(&body)
        });

        let mut resolved = HashMap::new();
        let mut any_ok = false;
        let mut last_error = None;
        for result in join_all(requests).await {
            match result {
                Ok(batch) => {
                    any_ok = true;
                    resolved.extend(batch);
                }
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) if !any_ok => Err(e),
            Some(e) => {
                log::warn!("{PROVIDER_NAME}: some {path} chunks failed: {e}");
                Ok(resolved)
            }
            None => Ok(resolved),
        }
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    symbols: &'a [String],
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct BatchResponse<T> {
    #[serde(default)]
    results: HashMap<String, T>,
}

#[derive(Deserialize)]
struct HoldingsEntry {
    name: Option<String>,
    #[serde(default)]
    constituents: Vec<EtfConstituent>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReferenceDataProvider for BatchHttpProvider {
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
        self.fetch_all("etf-holdings", symbols, Self::parse_etf_holdings)
            .await
    }

    async fn get_company_overviews(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SectorInfo>, CoreError> {
        self.fetch_all("company-overview", symbols, Self::parse_company_overviews)
            .await
    }
}
