use lookthrough_core::models::allocation::AssetClassWeight;
use lookthrough_core::models::cache::{LookupCache, MemoryCache, ResolverCaches};
use lookthrough_core::models::etf::{EtfConstituent, EtfProfile};
use lookthrough_core::models::exposure::{ExposureRecord, ExposureSource, ExposureSubRow};
use lookthrough_core::models::holding::{normalize_symbol, Holding, HoldingType};
use lookthrough_core::models::sector::SectorInfo;
use lookthrough_core::models::settings::{EngineSettings, ResolutionPolicy};
use std::sync::Arc;

fn source(origin: &str, via: Option<&str>, value: f64) -> ExposureSource {
    ExposureSource {
        origin_symbol: origin.into(),
        origin_name: format!("{origin} fund"),
        via_etf: via.map(String::from),
        percent_of_origin: 5.0,
        value_via_origin: value,
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Holding
// ═══════════════════════════════════════════════════════════════════

mod holding {
    use super::*;

    #[test]
    fn ticker_is_normalized() {
        let h = Holding::new("h1", "acc", Some("  aapl "), "Apple", 2.0, 50.0, 100.0, HoldingType::Stock);
        assert_eq!(h.ticker.as_deref(), Some("AAPL"));
        assert_eq!(h.symbol().as_deref(), Some("AAPL"));
    }

    #[test]
    fn blank_ticker_becomes_none() {
        let h = Holding::new("h1", "acc", Some("   "), "Mystery", 1.0, 1.0, 1.0, HoldingType::Fund);
        assert!(h.ticker.is_none());
        assert!(h.symbol().is_none());
    }

    #[test]
    fn cash_has_no_ticker() {
        let h = Holding::cash("c1", 2000.0);
        assert_eq!(h.holding_type, HoldingType::Cash);
        assert!(h.symbol().is_none());
        assert_eq!(h.market_value, 2000.0);
    }

    #[test]
    fn symbol_normalizes_deserialized_tickers() {
        let json = r#"{"id":"h1","accountId":"a1","ticker":" msft","name":"Microsoft",
            "quantity":3,"lastPrice":400,"marketValue":1200,"type":"stock"}"#;
        let h: Holding = serde_json::from_str(json).unwrap();
        assert_eq!(h.symbol().as_deref(), Some("MSFT"));
        assert_eq!(h.holding_type, HoldingType::Stock);
        assert_eq!(h.account_id, "a1");
    }

    #[test]
    fn in_account_moves_holding() {
        let h = Holding::stock("h1", "AAPL", 10.0).in_account("ira");
        assert_eq!(h.account_id, "ira");
    }

    #[test]
    fn holding_type_display_and_serde() {
        assert_eq!(HoldingType::Fund.to_string(), "fund");
        assert_eq!(serde_json::to_string(&HoldingType::Cash).unwrap(), "\"cash\"");
    }

    #[test]
    fn normalize_symbol_helper() {
        assert_eq!(normalize_symbol(" brk.b "), Some("BRK.B".to_string()));
        assert_eq!(normalize_symbol(""), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  EtfProfile
// ═══════════════════════════════════════════════════════════════════

mod etf_profile {
    use super::*;

    #[test]
    fn listed_weight_sums_constituents() {
        let p = EtfProfile::new(
            "xyz",
            "XYZ Fund",
            vec![EtfConstituent::new("AAPL", "Apple", 50.0), EtfConstituent::new("msft", "Microsoft", 30.0)],
        );
        assert_eq!(p.symbol, "XYZ");
        assert_eq!(p.constituents[1].symbol, "MSFT");
        assert!((p.listed_weight() - 80.0).abs() < 1e-9);
        assert!(!p.is_empty());
    }

    #[test]
    fn constituent_json_uses_camel_case() {
        let c = EtfConstituent::new("AAPL", "Apple", 6.5).with_sector("Technology");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"weightPercent\":6.5"));
        assert!(json.contains("\"sector\":\"Technology\""));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ExposureRecord
// ═══════════════════════════════════════════════════════════════════

mod exposure_record {
    use super::*;

    #[test]
    fn total_tracks_direct_plus_etf() {
        let mut r = ExposureRecord::new("AAPL", "Apple");
        r.add_direct(1000.0);
        r.add_via(source("VTI", None, 250.0));
        r.add_direct(500.0);
        assert_eq!(r.direct_value, 1500.0);
        assert_eq!(r.etf_value, 250.0);
        assert_eq!(r.total_value, 1750.0);
    }

    #[test]
    fn sources_merge_per_origin_and_via() {
        let mut r = ExposureRecord::new("AAPL", "Apple");
        r.add_via(source("VTI", None, 100.0));
        r.add_via(source("VTI", None, 50.0));
        r.add_via(source("VFIFX", Some("VTI"), 30.0));
        r.add_via(source("VFIFX", Some("VXUS"), 5.0));

        assert_eq!(r.sources.len(), 3);
        assert_eq!(r.sources[0].value_via_origin, 150.0);
        assert_eq!(r.sources[1].via_etf.as_deref(), Some("VTI"));
        assert_eq!(r.etf_value, 185.0);
        assert_eq!(r.total_value, 185.0);
    }

    #[test]
    fn classification_is_first_write_wins() {
        let mut r = ExposureRecord::new("AAPL", "Apple");
        r.classify(None, None);
        r.classify(Some(""), Some("  "));
        assert!(r.sector.is_none());

        r.classify(Some("Technology"), None);
        r.classify(Some("Consumer Electronics"), Some("Hardware"));
        assert_eq!(r.sector.as_deref(), Some("Technology"));
        assert_eq!(r.industry.as_deref(), Some("Hardware"));
    }

    #[test]
    fn sub_row_value() {
        let row = ExposureSubRow::Direct {
            value: 12.0,
            percent_of_portfolio: 1.0,
        };
        assert_eq!(row.value(), 12.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Caches
// ═══════════════════════════════════════════════════════════════════

mod caches {
    use super::*;

    #[test]
    fn memory_cache_get_set_clear() {
        let cache: MemoryCache<SectorInfo> = MemoryCache::new();
        assert!(cache.is_empty());
        cache.set("aapl", SectorInfo::new("Technology"));
        assert_eq!(cache.get("AAPL").unwrap().sector, "Technology");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get("AAPL").is_none());
    }

    #[test]
    fn same_key_insert_is_last_write_wins() {
        let cache: MemoryCache<SectorInfo> = MemoryCache::new();
        cache.set("AAPL", SectorInfo::new("Tech"));
        cache.set("AAPL", SectorInfo::new("Technology"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("AAPL").unwrap().sector, "Technology");
    }

    #[test]
    fn concurrent_inserts_of_distinct_keys() {
        let cache: Arc<MemoryCache<SectorInfo>> = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.set(&format!("T{t}X{i}"), SectorInfo::new("Technology"));
                        let _ = cache.get("T0X0");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
    }

    #[test]
    fn resolver_caches_clones_share_state() {
        let caches = ResolverCaches::new();
        let shared = caches.clone();
        shared.sectors.set("AAPL", SectorInfo::new("Technology"));
        shared
            .constituents
            .set("VTI", EtfProfile::new("VTI", "Total Market", vec![]));
        assert_eq!(caches.total_entries(), 2);

        caches.clear_all();
        assert_eq!(shared.total_entries(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.resolution_policy, ResolutionPolicy::FillMisses);
        assert_eq!(s.default_asset_class, "us_equity");
        assert_eq!(s.unknown_sector_label, "Unknown");
        assert!(s.network_enabled());
        assert!(!EngineSettings::offline().network_enabled());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let s = EngineSettings::from_json(
            r#"{"resolution_policy":"prefer_network","api_keys":{"alphavantage":"demo"}}"#,
        )
        .unwrap();
        assert_eq!(s.resolution_policy, ResolutionPolicy::PreferNetwork);
        assert_eq!(s.api_keys.get("alphavantage").map(String::as_str), Some("demo"));
        assert_eq!(s.max_batch_size, 100);
    }

    #[test]
    fn from_json_rejects_zero_batch_size() {
        assert!(EngineSettings::from_json(r#"{"max_batch_size":0}"#).is_err());
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(EngineSettings::from_json("not json").is_err());
    }
}

mod allocation {
    use super::*;

    #[test]
    fn asset_class_weight_uses_class_key() {
        let w: AssetClassWeight = serde_json::from_str(r#"{"class":"us_equity","percentage":60}"#).unwrap();
        assert_eq!(w.class_id, "us_equity");
        assert_eq!(w.percentage, 60.0);
    }
}
