pub mod catalog;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use catalog::Catalogs;
use models::{
    allocation::AssetClassBucket,
    cache::ResolverCaches,
    exposure::ExposureReport,
    holding::Holding,
    settings::EngineSettings,
};
use providers::registry::ProviderRegistry;
use services::{
    asset_class_service::AssetClassService,
    constituent_service::ConstituentService,
    exposure_service::ExposureService,
    holdings_service::HoldingsService,
    report_service::ReportService,
    sector_breakdown_service::SectorBreakdownService,
    sector_service::SectorService,
    translation_service::{EtfPosition, TranslationService},
};

use errors::CoreError;

/// Main entry point for the look-through exposure engine.
///
/// Holds the catalogs, settings, network providers and the two resolver
/// caches. Each `calculate_exposure` call is an independent batch run; only
/// the caches carry over between runs.
#[must_use]
pub struct ExposureEngine {
    catalogs: Catalogs,
    settings: EngineSettings,
    registry: ProviderRegistry,
    caches: ResolverCaches,
    holdings_service: HoldingsService,
    translation_service: TranslationService,
    constituent_service: ConstituentService,
    sector_service: SectorService,
    exposure_service: ExposureService,
    asset_class_service: AssetClassService,
    sector_breakdown_service: SectorBreakdownService,
    report_service: ReportService,
}

impl std::fmt::Debug for ExposureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureEngine")
            .field("etfs", &self.catalogs.etf_count())
            .field("mutual_funds", &self.catalogs.mutual_fund_count())
            .field("policy", &self.settings.resolution_policy)
            .field("caches", &self.caches)
            .finish()
    }
}

impl ExposureEngine {
    /// Engine over the built-in catalogs, with providers enabled by the
    /// settings (API keys, batch endpoint).
    pub fn with_builtin_catalogs(settings: EngineSettings) -> Result<Self, CoreError> {
        let catalogs = Catalogs::builtin()?;
        Self::new(catalogs, settings)
    }

    /// Engine over custom catalogs.
    pub fn new(catalogs: Catalogs, settings: EngineSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let registry = ProviderRegistry::new_with_defaults(&settings);
        Ok(Self::build(catalogs, settings, registry, ResolverCaches::new()))
    }

    /// Fully injected engine: explicit providers and caches. Used by tests
    /// and by callers sharing caches between engines.
    pub fn with_parts(
        catalogs: Catalogs,
        settings: EngineSettings,
        registry: ProviderRegistry,
        caches: ResolverCaches,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(catalogs, settings, registry, caches))
    }

    fn build(
        catalogs: Catalogs,
        settings: EngineSettings,
        registry: ProviderRegistry,
        caches: ResolverCaches,
    ) -> Self {
        Self {
            catalogs,
            settings,
            registry,
            caches,
            holdings_service: HoldingsService::new(),
            translation_service: TranslationService::new(),
            constituent_service: ConstituentService::new(),
            sector_service: SectorService::new(),
            exposure_service: ExposureService::new(),
            asset_class_service: AssetClassService::new(),
            sector_breakdown_service: SectorBreakdownService::new(),
            report_service: ReportService::new(),
        }
    }

    // ── Pipeline ────────────────────────────────────────────────────

    /// Resolve the look-through exposure of a set of holdings.
    ///
    /// Holdings are processed in slice order, which fixes the order of
    /// exposure sources and the first-write-wins sector choice. Missing
    /// catalog entries and failed network lookups only reduce fidelity;
    /// the only errors are contract violations (non-finite values).
    pub async fn calculate_exposure(&self, holdings: &[Holding]) -> Result<ExposureReport, CoreError> {
        self.holdings_service.validate(holdings)?;
        let total_value = self.holdings_service.total_value(holdings);
        let categorized = self.holdings_service.categorize(holdings, &self.catalogs);

        // Real ETFs first, then synthetic positions from mutual funds
        let mut positions: Vec<EtfPosition> = categorized
            .etfs
            .iter()
            .filter_map(|h| EtfPosition::from_holding(h))
            .collect();
        positions.extend(
            self.translation_service
                .translate_all(&categorized.mutual_funds, &self.catalogs),
        );

        let etf_symbols = self.constituent_service.symbols_for(&positions);
        let profiles = self
            .constituent_service
            .resolve(
                &etf_symbols,
                &self.catalogs,
                self.caches.constituents.as_ref(),
                &self.registry,
                self.settings.resolution_policy,
            )
            .await;

        let sector_symbols = self
            .sector_service
            .symbols_for(&categorized.direct, &positions, &profiles);
        let sectors = self
            .sector_service
            .resolve(
                &sector_symbols,
                &self.catalogs,
                self.caches.sectors.as_ref(),
                &self.registry,
                self.settings.resolution_policy,
            )
            .await;

        let records = self
            .exposure_service
            .aggregate(&categorized.direct, &positions, &profiles, &sectors);
        let records = self.report_service.finalize_records(records, total_value)?;

        let sector_breakdown = self.sector_breakdown_service.breakdown(
            &records,
            total_value,
            &self.settings.unknown_sector_label,
        );
        let asset_class_breakdown = self.classify_asset_classes(holdings);

        log::info!(
            "Calculated exposure for {} holdings: {} tickers, {} ETF profiles, total value {:.2}",
            holdings.len(),
            records.len(),
            profiles.len(),
            total_value
        );

        self.report_service.build_report(
            records,
            total_value,
            asset_class_breakdown,
            sector_breakdown,
            profiles,
        )
    }

    /// The wrapper-level asset-class view on its own. Catalog-only; never
    /// touches the network or the caches.
    #[must_use]
    pub fn classify_asset_classes(&self, holdings: &[Holding]) -> Vec<AssetClassBucket> {
        self.asset_class_service.classify(
            holdings,
            &self.catalogs,
            &self.settings.default_asset_class,
        )
    }

    // ── Cache control ───────────────────────────────────────────────

    /// Clear both resolver caches. Call when the holdings dataset changes
    /// owner (bulk import, reset).
    pub fn clear_caches(&self) {
        self.caches.clear_all();
        log::debug!("Cleared resolver caches");
    }

    #[must_use]
    pub fn caches(&self) -> &ResolverCaches {
        &self.caches
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}
