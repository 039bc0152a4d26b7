// ═══════════════════════════════════════════════════════════════════
// Provider Tests: Registry routing/fallback, Alpha Vantage & batch parsing
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;

use lookthrough_core::errors::CoreError;
use lookthrough_core::models::etf::{EtfConstituent, EtfProfile};
use lookthrough_core::models::sector::SectorInfo;
use lookthrough_core::models::settings::EngineSettings;
use lookthrough_core::providers::alphavantage::{title_case, AlphaVantageProvider};
use lookthrough_core::providers::batch_http::BatchHttpProvider;
use lookthrough_core::providers::registry::ProviderRegistry;
use lookthrough_core::providers::traits::{LookupKind, ReferenceDataProvider};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Answers only for the symbols it knows.
struct MockProvider {
    name: String,
    lookups: Vec<LookupKind>,
    profiles: HashMap<String, EtfProfile>,
    sectors: HashMap<String, SectorInfo>,
}

impl MockProvider {
    fn new(name: &str, lookups: Vec<LookupKind>) -> Self {
        Self {
            name: name.to_string(),
            lookups,
            profiles: HashMap::new(),
            sectors: HashMap::new(),
        }
    }

    fn with_profile(mut self, symbol: &str, constituents: &[(&str, f64)]) -> Self {
        let constituents = constituents
            .iter()
            .map(|(s, w)| EtfConstituent::new(*s, *s, *w))
            .collect();
        self.profiles
            .insert(symbol.to_string(), EtfProfile::new(symbol, symbol, constituents));
        self
    }

    /// Store a profile exactly as given, without any clean-up.
    fn with_raw_profile(mut self, key: &str, profile: EtfProfile) -> Self {
        self.profiles.insert(key.to_string(), profile);
        self
    }

    fn with_sector(mut self, symbol: &str, sector: &str) -> Self {
        self.sectors.insert(symbol.to_string(), SectorInfo::new(sector));
        self
    }
}

fn raw_constituent(symbol: &str, weight_percent: f64, sector: Option<&str>) -> EtfConstituent {
    EtfConstituent {
        symbol: symbol.to_string(),
        name: symbol.trim().to_string(),
        weight_percent,
        sector: sector.map(str::to_string),
    }
}

#[async_trait]
impl ReferenceDataProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_lookups(&self) -> Vec<LookupKind> {
        self.lookups.clone()
    }

    async fn get_etf_profiles(&self, symbols: &[String]) -> Result<HashMap<String, EtfProfile>, CoreError> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.profiles.get(s).map(|p| (s.clone(), p.clone())))
            .collect())
    }

    async fn get_company_overviews(&self, symbols: &[String]) -> Result<HashMap<String, SectorInfo>, CoreError> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.sectors.get(s).map(|i| (s.clone(), i.clone())))
            .collect())
    }
}

/// A provider that always fails.
struct FailingProvider;

#[async_trait]
impl ReferenceDataProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    fn supported_lookups(&self) -> Vec<LookupKind> {
        vec![LookupKind::EtfHoldings, LookupKind::CompanyOverview]
    }

    async fn get_etf_profiles(&self, _symbols: &[String]) -> Result<HashMap<String, EtfProfile>, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }

    async fn get_company_overviews(&self, _symbols: &[String]) -> Result<HashMap<String, SectorInfo>, CoreError> {
        Err(CoreError::Api {
            provider: "Failing".into(),
            message: "HTTP 503".into(),
        })
    }
}

fn syms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// ProviderRegistry: Construction
// ═══════════════════════════════════════════════════════════════════

mod registry_construction {
    use super::*;

    #[test]
    fn new_creates_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_provider_for(LookupKind::EtfHoldings));
        assert!(!registry.has_provider_for(LookupKind::CompanyOverview));
    }

    #[test]
    fn default_settings_register_nothing() {
        let registry = ProviderRegistry::new_with_defaults(&EngineSettings::default());
        assert!(registry.get_providers_for(LookupKind::EtfHoldings).is_empty());
    }

    #[test]
    fn api_key_enables_alpha_vantage() {
        let mut settings = EngineSettings::default();
        settings.api_keys.insert("alphavantage".into(), "demo".into());
        let registry = ProviderRegistry::new_with_defaults(&settings);
        assert_eq!(
            registry.get_provider_names(LookupKind::CompanyOverview),
            vec!["Alpha Vantage".to_string()]
        );
    }

    #[test]
    fn batch_endpoint_registers_first() {
        let mut settings = EngineSettings::default();
        settings.api_keys.insert("alphavantage".into(), "demo".into());
        settings.batch_endpoint = Some("https://refdata.example.com/v1/".into());
        let registry = ProviderRegistry::new_with_defaults(&settings);
        assert_eq!(
            registry.get_provider_names(LookupKind::EtfHoldings),
            vec!["Batch endpoint".to_string(), "Alpha Vantage".to_string()]
        );
    }

    #[test]
    fn routes_by_lookup_kind() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("SectorsOnly", vec![LookupKind::CompanyOverview])));
        assert!(registry.has_provider_for(LookupKind::CompanyOverview));
        assert!(!registry.has_provider_for(LookupKind::EtfHoldings));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProviderRegistry: Batch fetch with fallback
// ═══════════════════════════════════════════════════════════════════

mod registry_fetch {
    use super::*;

    #[tokio::test]
    async fn no_provider_is_an_error() {
        let registry = ProviderRegistry::new();
        match registry.fetch_etf_profiles(&syms(&["VTI"])).await {
            Err(CoreError::NoProvider(kind)) => assert_eq!(kind, "ETF holdings"),
            other => panic!("Expected NoProvider, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn falls_back_to_next_provider_for_missing_symbols() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(
            MockProvider::new("First", vec![LookupKind::EtfHoldings]).with_profile("VTI", &[("AAPL", 6.0)]),
        ));
        registry.register(Box::new(
            MockProvider::new("Second", vec![LookupKind::EtfHoldings])
                .with_profile("VTI", &[("AAPL", 99.0)])
                .with_profile("QQQ", &[("MSFT", 8.0)]),
        ));

        let found = registry.fetch_etf_profiles(&syms(&["VTI", "QQQ", "NOPE"])).await.unwrap();
        assert_eq!(found.len(), 2);
        // First provider's answer is kept
        assert_eq!(found["VTI"].constituents[0].weight_percent, 6.0);
        assert_eq!(found["QQQ"].constituents[0].symbol, "MSFT");
    }

    #[tokio::test]
    async fn failing_provider_is_skipped() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(FailingProvider));
        registry.register(Box::new(
            MockProvider::new("Backup", vec![LookupKind::CompanyOverview]).with_sector("AAPL", "Technology"),
        ));

        let found = registry.fetch_company_overviews(&syms(&["AAPL"])).await.unwrap();
        assert_eq!(found["AAPL"].sector, "Technology");
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(FailingProvider));
        assert!(registry.fetch_company_overviews(&syms(&["AAPL"])).await.is_err());
    }

    #[tokio::test]
    async fn provider_tickers_are_normalized() {
        let raw = EtfProfile {
            symbol: "xyz".into(),
            name: " ".into(),
            constituents: vec![
                raw_constituent(" aapl ", 50.0, Some(" Technology ")),
                raw_constituent("AAPL", 10.0, None),
                raw_constituent("  ", 5.0, None),
                raw_constituent("msft", f64::NAN, None),
            ],
        };
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(
            MockProvider::new("Raw", vec![LookupKind::EtfHoldings]).with_raw_profile("XYZ", raw),
        ));

        let found = registry.fetch_etf_profiles(&syms(&["XYZ"])).await.unwrap();
        let profile = &found["XYZ"];
        assert_eq!(profile.symbol, "XYZ");
        assert_eq!(profile.name, "XYZ");
        assert_eq!(profile.constituents.len(), 1);
        assert_eq!(profile.constituents[0].symbol, "AAPL");
        assert_eq!(profile.constituents[0].weight_percent, 60.0);
        assert_eq!(profile.constituents[0].sector.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn provider_sectors_are_trimmed() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(
            MockProvider::new("Padded", vec![LookupKind::CompanyOverview]).with_sector("AAPL", " Technology "),
        ));
        let found = registry.fetch_company_overviews(&syms(&["AAPL"])).await.unwrap();
        assert_eq!(found["AAPL"].sector, "Technology");
    }

    #[tokio::test]
    async fn empty_profiles_count_as_misses() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(
            MockProvider::new("Empty", vec![LookupKind::EtfHoldings]).with_profile("BND", &[]),
        ));
        let found = registry.fetch_etf_profiles(&syms(&["BND"])).await.unwrap();
        assert!(found.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Alpha Vantage: response parsing
// ═══════════════════════════════════════════════════════════════════

mod alphavantage {
    use super::*;

    #[test]
    fn etf_profile_weights_become_percentages() {
        let body = r#"{"net_assets":"1","holdings":[
            {"symbol":"NVDA","description":"NVIDIA CORP","weight":"0.0914"},
            {"symbol":"msft","description":"MICROSOFT CORP","weight":"0.085"},
            {"symbol":"n/a","description":"CASH","weight":"0.001"},
            {"symbol":"BAD","description":"BROKEN","weight":"abc"}]}"#;
        let profile = AlphaVantageProvider::parse_etf_profile("QQQ", body).unwrap().unwrap();
        assert_eq!(profile.symbol, "QQQ");
        assert_eq!(profile.constituents.len(), 2);
        assert!((profile.constituents[0].weight_percent - 9.14).abs() < 1e-9);
        assert_eq!(profile.constituents[1].symbol, "MSFT");
    }

    #[test]
    fn etf_profile_unknown_symbol_is_none() {
        assert!(AlphaVantageProvider::parse_etf_profile("ZZZ", "{}").unwrap().is_none());
    }

    #[test]
    fn etf_profile_rate_limit_is_error() {
        let body = r#"{"Information":"Our standard API rate limit is 25 requests per day."}"#;
        match AlphaVantageProvider::parse_etf_profile("QQQ", body) {
            Err(CoreError::Api { provider, message }) => {
                assert_eq!(provider, "Alpha Vantage");
                assert!(message.contains("rate limit"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn overview_is_title_cased() {
        let body = r#"{"Symbol":"IBM","Sector":"TECHNOLOGY","Industry":"COMPUTER & OFFICE EQUIPMENT"}"#;
        let info = AlphaVantageProvider::parse_company_overview("IBM", body).unwrap().unwrap();
        assert_eq!(info.sector, "Technology");
        assert_eq!(info.industry.as_deref(), Some("Computer & Office Equipment"));
    }

    #[test]
    fn overview_none_placeholder_is_unresolved() {
        let body = r#"{"Symbol":"SPY","Sector":"None","Industry":"None"}"#;
        assert!(AlphaVantageProvider::parse_company_overview("SPY", body).unwrap().is_none());
    }

    #[test]
    fn overview_invalid_json_is_error() {
        assert!(AlphaVantageProvider::parse_company_overview("IBM", "<html>").is_err());
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("REAL ESTATE"), "Real Estate");
        assert_eq!(title_case("  energy "), "Energy");
        assert_eq!(title_case(""), "");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Batch endpoint: parsing & chunking
// ═══════════════════════════════════════════════════════════════════

mod batch_http {
    use super::*;

    #[test]
    fn parses_holdings_results() {
        let body = r#"{"results":{"vti":{"name":"Total Market","constituents":[
            {"symbol":"aapl","name":"Apple","weightPercent":6.0,"sector":"Technology"}]},
            "XYZ":{"constituents":[]}}}"#;
        let profiles = BatchHttpProvider::parse_etf_holdings(body).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles["VTI"].name, "Total Market");
        assert_eq!(profiles["VTI"].constituents[0].symbol, "AAPL");
        assert_eq!(profiles["XYZ"].name, "XYZ");
    }

    #[test]
    fn parses_overview_results_and_drops_blank_sectors() {
        let body = r#"{"results":{"aapl":{"sector":"Technology","industry":"Consumer Electronics"},
            "ZZZ":{"sector":""}}}"#;
        let overviews = BatchHttpProvider::parse_company_overviews(body).unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews["AAPL"].industry.as_deref(), Some("Consumer Electronics"));
    }

    #[test]
    fn overview_fields_are_trimmed() {
        let body = r#"{"results":{" aapl ":{"sector":" Technology ","industry":" Consumer Electronics "},
            "MSFT":{"sector":"Technology","industry":"  "}}}"#;
        let overviews = BatchHttpProvider::parse_company_overviews(body).unwrap();
        assert_eq!(overviews["AAPL"].sector, "Technology");
        assert_eq!(overviews["AAPL"].industry.as_deref(), Some("Consumer Electronics"));
        assert!(overviews["MSFT"].industry.is_none());
    }

    #[test]
    fn missing_results_is_empty() {
        assert!(BatchHttpProvider::parse_etf_holdings("{}").unwrap().is_empty());
    }

    #[test]
    fn invalid_body_is_error() {
        assert!(BatchHttpProvider::parse_etf_holdings("not json").is_err());
    }

    #[test]
    fn chunks_by_max_batch_size() {
        let provider = BatchHttpProvider::new("https://refdata.example.com/".into(), 5, 2);
        assert_eq!(provider.base_url(), "https://refdata.example.com");
        let symbols = syms(&["A", "B", "C", "D", "E"]);
        let chunks = provider.chunk(&symbols);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], &["E".to_string()][..]);
    }
}
