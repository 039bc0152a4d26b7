use std::collections::HashMap;

use crate::models::etf::EtfProfile;
use crate::models::exposure::{ExposureRecord, ExposureSource};
use crate::models::holding::Holding;
use crate::models::sector::SectorInfo;

use super::translation_service::EtfPosition;

/// Accumulates direct and look-through value per underlying ticker.
///
/// Totals do not depend on processing order. The order of `sources` and
/// which sector wins a conflict do, so inputs are processed in a fixed
/// order: direct holdings, then ETF positions, each in the order given.
pub struct ExposureService;

/// Records in first-seen order, with a ticker index for accumulation.
#[derive(Debug, Default)]
struct Accumulator {
    records: Vec<ExposureRecord>,
    index: HashMap<String, usize>,
}

impl Accumulator {
    fn entry(&mut self, ticker: &str, name: &str) -> &mut ExposureRecord {
        let idx = match self.index.get(ticker) {
            Some(&idx) => idx,
            None => {
                self.records.push(ExposureRecord::new(ticker, name));
                self.index.insert(ticker.to_string(), self.records.len() - 1);
                self.records.len() - 1
            }
        };
        &mut self.records[idx]
    }
}

impl ExposureService {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        direct: &[&Holding],
        positions: &[EtfPosition],
        profiles: &HashMap<String, EtfProfile>,
        sectors: &HashMap<String, SectorInfo>,
    ) -> Vec<ExposureRecord> {
        let mut acc = Accumulator::default();

        // 1. Direct holdings, summed across accounts sharing a ticker
        for holding in direct {
            let Some(ticker) = holding.symbol() else {
                continue;
            };
            let info = sectors.get(&ticker);
            let record = acc.entry(&ticker, &holding.name);
            record.add_direct(holding.market_value);
            record.classify(
                info.map(|i| i.sector.as_str()),
                info.and_then(|i| i.industry.as_deref()),
            );
        }

        // 2. Look-through value of every real and synthetic ETF position
        for position in positions {
            let Some(profile) = profiles.get(&position.symbol) else {
                log::debug!(
                    "ETF {} (via {}) is unresolved; it contributes no exposure",
                    position.symbol,
                    position.label_symbol()
                );
                continue;
            };

            for constituent in &profile.constituents {
                let value = position.market_value * constituent.weight_percent / 100.0;
                if value == 0.0 {
                    continue;
                }

                let percent_of_origin = match &position.origin {
                    Some(origin) => origin.percentage * constituent.weight_percent / 100.0,
                    None => constituent.weight_percent,
                };
                let info = sectors.get(&constituent.symbol);

                let record = acc.entry(&constituent.symbol, &constituent.name);
                record.add_via(ExposureSource {
                    origin_symbol: position.label_symbol().to_string(),
                    origin_name: position.label_name().to_string(),
                    via_etf: position.origin.as_ref().map(|_| position.symbol.clone()),
                    percent_of_origin,
                    value_via_origin: value,
                });
                record.classify(
                    info.map(|i| i.sector.as_str())
                        .or(constituent.sector.as_deref()),
                    info.and_then(|i| i.industry.as_deref()),
                );
            }
        }

        acc.records
    }
}

impl Default for ExposureService {
    fn default() -> Self {
        Self::new()
    }
}
