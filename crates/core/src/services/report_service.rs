use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use crate::errors::CoreError;
use crate::models::allocation::{AssetClassBucket, SectorBucket};
use crate::models::etf::EtfProfile;
use crate::models::exposure::{ExposureRecord, ExposureReport, ExposureSubRow};

/// `value / total × 100`, or 0 when the total is not positive.
/// Never NaN or infinite for finite inputs.
pub fn percent_of(value: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() {
        (value / total) * 100.0
    } else {
        0.0
    }
}

/// Sort largest value first; equal values fall back to ascending key so
/// output order never depends on hash-map iteration.
pub fn sort_descending<T>(items: &mut [T], value: impl Fn(&T) -> f64, key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        value(b)
            .partial_cmp(&value(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| key(a).cmp(key(b)))
    });
}

/// Final pass: percentages, drill-down rows, ordering, report assembly.
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Fill `percent_of_portfolio` and `sub_rows` on every record and sort
    /// the list by `total_value`, largest first.
    pub fn finalize_records(
        &self,
        mut records: Vec<ExposureRecord>,
        total_portfolio_value: f64,
    ) -> Result<Vec<ExposureRecord>, CoreError> {
        check_total(total_portfolio_value)?;

        for record in &mut records {
            record.percent_of_portfolio = percent_of(record.total_value, total_portfolio_value);

            let mut rows = Vec::with_capacity(record.sources.len() + 1);
            if record.direct_value > 0.0 {
                rows.push(ExposureSubRow::Direct {
                    value: record.direct_value,
                    percent_of_portfolio: percent_of(record.direct_value, total_portfolio_value),
                });
            }
            rows.extend(record.sources.iter().map(|source| ExposureSubRow::Via {
                origin_symbol: source.origin_symbol.clone(),
                origin_name: source.origin_name.clone(),
                via_etf: source.via_etf.clone(),
                percent_of_origin: source.percent_of_origin,
                value: source.value_via_origin,
                percent_of_portfolio: percent_of(source.value_via_origin, total_portfolio_value),
            }));
            record.sub_rows = rows;
        }

        sort_descending(&mut records, |r| r.total_value, |r| r.ticker.as_str());
        Ok(records)
    }

    /// Assemble the report handed to the display layer.
    pub fn build_report(
        &self,
        records: Vec<ExposureRecord>,
        total_portfolio_value: f64,
        asset_class_breakdown: Vec<AssetClassBucket>,
        sector_breakdown: Vec<SectorBucket>,
        resolved_profiles: HashMap<String, EtfProfile>,
    ) -> Result<ExposureReport, CoreError> {
        check_total(total_portfolio_value)?;

        Ok(ExposureReport {
            exposure_records: records,
            total_portfolio_value,
            asset_class_breakdown,
            sector_breakdown,
            resolved_profiles: resolved_profiles.into_iter().collect::<BTreeMap<_, _>>(),
            calculated_at: Utc::now(),
        })
    }
}

fn check_total(total: f64) -> Result<(), CoreError> {
    if !total.is_finite() {
        return Err(CoreError::ValidationError(format!(
            "Total portfolio value must be finite, got {total}"
        )));
    }
    Ok(())
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}
