use std::collections::HashMap;

use crate::models::allocation::SectorBucket;
use crate::models::exposure::ExposureRecord;

use super::report_service::{percent_of, sort_descending};

/// Rolls look-through exposure up by sector.
///
/// Sums `total_value` of exposure records, so the buckets describe what the
/// investor effectively owns. This is deliberately a different view from
/// the asset-class breakdown, which splits raw wrapper value.
pub struct SectorBreakdownService;

impl SectorBreakdownService {
    pub fn new() -> Self {
        Self
    }

    /// Percentages are relative to the total portfolio value, matching
    /// `percent_of_portfolio` on the records.
    pub fn breakdown(
        &self,
        records: &[ExposureRecord],
        total_portfolio_value: f64,
        unknown_label: &str,
    ) -> Vec<SectorBucket> {
        let mut values: HashMap<&str, f64> = HashMap::new();
        for record in records {
            let sector = record.sector.as_deref().unwrap_or(unknown_label);
            *values.entry(sector).or_insert(0.0) += record.total_value;
        }

        let mut buckets: Vec<SectorBucket> = values
            .into_iter()
            .map(|(sector, market_value)| SectorBucket {
                sector_name: sector.to_string(),
                market_value,
                percentage: percent_of(market_value, total_portfolio_value),
            })
            .collect();

        sort_descending(&mut buckets, |b| b.market_value, |b| b.sector_name.as_str());
        buckets
    }
}

impl Default for SectorBreakdownService {
    fn default() -> Self {
        Self::new()
    }
}
