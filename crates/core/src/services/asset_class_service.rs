use std::collections::HashMap;

use crate::catalog::Catalogs;
use crate::models::allocation::AssetClassBucket;
use crate::models::holding::{Holding, HoldingType};
use crate::models::settings::CASH_ASSET_CLASS;

use super::report_service::{percent_of, sort_descending};

/// Allocates raw holding value across asset-class buckets.
///
/// Works on wrapper-level value, not look-through exposure, and routes every
/// dollar somewhere: whatever the catalogs cannot classify lands in the
/// default class, so Σ buckets equals the portfolio total.
pub struct AssetClassService;

#[derive(Default)]
struct Buckets {
    values: HashMap<String, f64>,
}

impl Buckets {
    fn add(&mut self, class_id: &str, value: f64) {
        *self.values.entry(class_id.to_string()).or_insert(0.0) += value;
    }
}

impl AssetClassService {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(
        &self,
        holdings: &[Holding],
        catalogs: &Catalogs,
        default_class: &str,
    ) -> Vec<AssetClassBucket> {
        let mut buckets = Buckets::default();

        for holding in holdings {
            let value = holding.market_value;
            match (holding.holding_type, holding.symbol()) {
                (HoldingType::Cash, _) => buckets.add(CASH_ASSET_CLASS, value),
                (_, None) => buckets.add(default_class, value),
                (HoldingType::Stock, Some(symbol)) => {
                    buckets.add(catalogs.stock_class(&symbol).unwrap_or(default_class), value)
                }
                (HoldingType::Fund, Some(symbol)) => match catalogs.mutual_fund(&symbol) {
                    Some(fund) => {
                        let mapped = fund.mapped_percentage();
                        // Over-allocated funds are scaled back to 100%
                        let scale = if mapped > 100.0 { 100.0 / mapped } else { 1.0 };
                        for mapping in &fund.mappings {
                            let share = value * mapping.percentage / 100.0 * scale;
                            self.distribute_etf(&mut buckets, &mapping.etf_symbol, share, catalogs, default_class);
                        }
                        // Under-allocated funds send the unmapped rest to the default class
                        let unmapped = 100.0 - mapped;
                        if unmapped > 0.0 {
                            buckets.add(default_class, value * unmapped / 100.0);
                        }
                    }
                    None => self.distribute_etf(&mut buckets, &symbol, value, catalogs, default_class),
                },
            }
        }

        let total: f64 = holdings.iter().map(|h| h.market_value).sum();
        let mut breakdown: Vec<AssetClassBucket> = buckets
            .values
            .into_iter()
            .map(|(class_id, market_value)| AssetClassBucket {
                display_name: catalogs.asset_class_name(&class_id),
                percentage: percent_of(market_value, total),
                class_id,
                market_value,
            })
            .collect();

        sort_descending(&mut breakdown, |b| b.market_value, |b| b.class_id.as_str());
        breakdown
    }

    /// Split an ETF's value by its class breakdown; unknown ETFs go to the
    /// default class in full.
    fn distribute_etf(
        &self,
        buckets: &mut Buckets,
        symbol: &str,
        value: f64,
        catalogs: &Catalogs,
        default_class: &str,
    ) {
        let weights = catalogs.etf_classes(symbol).unwrap_or_default();
        let sum: f64 = weights.iter().map(|w| w.percentage).sum();
        if sum <= 0.0 {
            buckets.add(default_class, value);
            return;
        }
        // Normalized so rounding in the catalog cannot leak value
        for weight in weights {
            buckets.add(&weight.class_id, value * weight.percentage / sum);
        }
    }
}

impl Default for AssetClassService {
    fn default() -> Self {
        Self::new()
    }
}
