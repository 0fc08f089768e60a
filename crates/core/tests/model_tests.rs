// ═══════════════════════════════════════════════════════════════════
// Model Tests: AssetCategory, Holding, HoldingTable, PriceQuote,
// HistoricalPeriod, Settings
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::io::Write;

use portfolio_analyzer_core::errors::CoreError;
use portfolio_analyzer_core::models::chart::{HistoricalChart, HistoricalPeriod, HistoricalSeries};
use portfolio_analyzer_core::models::holding::{is_tradable, AssetCategory, Holding, HoldingTable};
use portfolio_analyzer_core::models::price::{PriceQuote, PriceSource};
use portfolio_analyzer_core::models::settings::{Settings, ALPHA_VANTAGE_KEY_NAME};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// AssetCategory
// ═══════════════════════════════════════════════════════════════════

mod asset_category {
    use super::*;

    #[test]
    fn display_labels() {
        assert_eq!(AssetCategory::Stocks.to_string(), "Stocks");
        assert_eq!(AssetCategory::Etfs.to_string(), "ETFs");
        assert_eq!(AssetCategory::RealEstate.to_string(), "Real Estate");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("stocks".parse::<AssetCategory>(), Ok(AssetCategory::Stocks));
        assert_eq!("ETF".parse::<AssetCategory>(), Ok(AssetCategory::Etfs));
        assert_eq!("etfs".parse::<AssetCategory>(), Ok(AssetCategory::Etfs));
        assert_eq!("CRYPTO".parse::<AssetCategory>(), Ok(AssetCategory::Crypto));
    }

    #[test]
    fn parse_real_estate_variants() {
        assert_eq!("Real Estate".parse::<AssetCategory>(), Ok(AssetCategory::RealEstate));
        assert_eq!("RealEstate".parse::<AssetCategory>(), Ok(AssetCategory::RealEstate));
        assert_eq!("real_estate".parse::<AssetCategory>(), Ok(AssetCategory::RealEstate));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for category in AssetCategory::all() {
            assert_eq!(category.to_string().parse::<AssetCategory>(), Ok(*category));
        }
    }

    #[test]
    fn unknown_label_is_error_but_from_label_defaults_to_other() {
        assert!("Art".parse::<AssetCategory>().is_err());
        assert_eq!(AssetCategory::from_label("Art"), AssetCategory::Other);
        assert_eq!(AssetCategory::from_label(""), AssetCategory::Other);
    }

    #[test]
    fn real_estate_and_cash_are_not_market_traded() {
        assert!(!AssetCategory::RealEstate.is_market_traded());
        assert!(!AssetCategory::Cash.is_market_traded());
        assert!(AssetCategory::Stocks.is_market_traded());
        assert!(AssetCategory::Crypto.is_market_traded());
    }

    #[test]
    fn next_and_prev_wrap_around() {
        assert_eq!(AssetCategory::Stocks.next(), AssetCategory::Etfs);
        assert_eq!(AssetCategory::Other.next(), AssetCategory::Stocks);
        assert_eq!(AssetCategory::Stocks.prev(), AssetCategory::Other);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holding
// ═══════════════════════════════════════════════════════════════════

mod holding {
    use super::*;

    #[test]
    fn new_trims_symbol_and_keeps_case() {
        let h = Holding::new("  Real Estate ", AssetCategory::RealEstate, 1.0, 100.0);
        assert_eq!(h.symbol, "Real Estate");
        assert!(h.current_price.is_none());
    }

    #[test]
    fn cost_basis_is_quantity_times_purchase_price() {
        let h = Holding::new("AAPL", AssetCategory::Stocks, 10.0, 150.0);
        assert!((h.cost_basis() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn key_is_uppercase() {
        let h = Holding::new("aapl", AssetCategory::Stocks, 1.0, 1.0);
        assert_eq!(h.key(), "AAPL");
    }

    #[test]
    fn tradable_requires_market_category() {
        let house = Holding::new("HOUSE", AssetCategory::RealEstate, 1.0, 1.0);
        assert!(!house.is_tradable());
        let aapl = Holding::new("AAPL", AssetCategory::Stocks, 1.0, 1.0);
        assert!(aapl.is_tradable());
    }
}

// ═══════════════════════════════════════════════════════════════════
// is_tradable
// ═══════════════════════════════════════════════════════════════════

mod tradable {
    use super::*;

    #[test]
    fn uppercase_tickers() {
        assert!(is_tradable("AAPL"));
        assert!(is_tradable("BRK.B"));
        assert!(is_tradable("GC=F"));
    }

    #[test]
    fn dash_pairs() {
        assert!(is_tradable("BTC-USD"));
        assert!(is_tradable("eth-usd"));
    }

    #[test]
    fn free_form_names_rejected() {
        assert!(!is_tradable("Real Estate"));
        assert!(!is_tradable("Gold"));
        assert!(!is_tradable("my house"));
        assert!(!is_tradable(""));
        assert!(!is_tradable("1234"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// HoldingTable
// ═══════════════════════════════════════════════════════════════════

mod holding_table {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut table = HoldingTable::new();
        table.upsert(Holding::new("MSFT", AssetCategory::Stocks, 1.0, 1.0));
        table.upsert(Holding::new("AAPL", AssetCategory::Stocks, 1.0, 1.0));
        table.upsert(Holding::new("VTI", AssetCategory::Etfs, 1.0, 1.0));
        let symbols: Vec<&str> = table.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "VTI"]);
    }

    #[test]
    fn upsert_merges_same_symbol_case_insensitive() {
        let mut table = HoldingTable::new();
        assert!(!table.upsert(Holding::new("AAPL", AssetCategory::Stocks, 10.0, 100.0)));
        assert!(table.upsert(Holding::new("aapl", AssetCategory::Stocks, 10.0, 200.0)));

        assert_eq!(table.len(), 1);
        let h = table.get("AAPL").unwrap();
        assert!((h.quantity - 20.0).abs() < 1e-9);
        // weighted average: (1000 + 2000) / 20
        assert!((h.purchase_price - 150.0).abs() < 1e-9);
        assert!((h.cost_basis() - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn upsert_replaces_manual_price_only_when_given() {
        let mut table = HoldingTable::new();
        table.upsert(Holding::new("AAPL", AssetCategory::Stocks, 1.0, 100.0).with_current_price(120.0));
        table.upsert(Holding::new("AAPL", AssetCategory::Stocks, 1.0, 100.0));
        assert_eq!(table.get("AAPL").unwrap().current_price, Some(120.0));

        table.upsert(Holding::new("AAPL", AssetCategory::Stocks, 1.0, 100.0).with_current_price(130.0));
        assert_eq!(table.get("AAPL").unwrap().current_price, Some(130.0));
    }

    #[test]
    fn upsert_keeps_first_seen_category() {
        let mut table = HoldingTable::new();
        table.upsert(Holding::new("GLD", AssetCategory::Etfs, 1.0, 100.0));
        assert!(table.upsert(Holding::new("gld", AssetCategory::Commodities, 1.0, 100.0)));

        let h = table.get("GLD").unwrap();
        assert_eq!(h.category, AssetCategory::Etfs);
        assert_eq!(h.symbol, "GLD");
        assert!((h.quantity - 2.0).abs() < 1e-9);
    }

    #[test]
    fn merge_of_zero_quantities_has_zero_purchase_price() {
        let mut table = HoldingTable::new();
        table.upsert(Holding::new("X", AssetCategory::Other, 0.0, 10.0));
        table.upsert(Holding::new("X", AssetCategory::Other, 0.0, 20.0));
        assert_eq!(table.get("X").unwrap().purchase_price, 0.0);
    }

    #[test]
    fn remove_and_clear() {
        let mut table = HoldingTable::from_holdings(vec![
            Holding::new("AAPL", AssetCategory::Stocks, 1.0, 1.0),
            Holding::new("VTI", AssetCategory::Etfs, 1.0, 1.0),
        ]);
        assert!(table.remove("vti").is_some());
        assert!(table.remove("VTI").is_none());
        assert_eq!(table.len(), 1);
        table.clear();
        assert!(table.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceQuote / PriceSource
// ═══════════════════════════════════════════════════════════════════

mod price_quote {
    use super::*;

    #[test]
    fn missing_is_zero() {
        let q = PriceQuote::missing();
        assert_eq!(q.price, 0.0);
        assert!(q.is_missing());
    }

    #[test]
    fn market_carries_provider_name() {
        let q = PriceQuote::market(10.0, "Yahoo Finance");
        assert_eq!(
            q.source,
            PriceSource::Market {
                provider: "Yahoo Finance".into()
            }
        );
        assert_eq!(q.source.to_string(), "Yahoo Finance");
        assert_eq!(PriceSource::Manual.to_string(), "manual");
    }
}

// ═══════════════════════════════════════════════════════════════════
// HistoricalPeriod / HistoricalChart
// ═══════════════════════════════════════════════════════════════════

mod historical_period {
    use super::*;

    #[test]
    fn default_is_one_year() {
        assert_eq!(HistoricalPeriod::default(), HistoricalPeriod::OneYear);
    }

    #[test]
    fn parse_labels() {
        assert_eq!("1m".parse::<HistoricalPeriod>(), Ok(HistoricalPeriod::OneMonth));
        assert_eq!("3mo".parse::<HistoricalPeriod>(), Ok(HistoricalPeriod::ThreeMonths));
        assert_eq!("5Y".parse::<HistoricalPeriod>(), Ok(HistoricalPeriod::FiveYears));
        assert!("10y".parse::<HistoricalPeriod>().is_err());
    }

    #[test]
    fn range_ending_subtracts_days() {
        let (from, to) = HistoricalPeriod::OneMonth.range_ending(date(2025, 3, 31));
        assert_eq!(to, date(2025, 3, 31));
        assert_eq!(from, date(2025, 3, 1));
    }

    #[test]
    fn next_cycles() {
        assert_eq!(HistoricalPeriod::FiveYears.next(), HistoricalPeriod::OneMonth);
        assert_eq!(HistoricalPeriod::OneYear.next(), HistoricalPeriod::TwoYears);
    }

    #[test]
    fn serde_uses_short_labels() {
        let json = serde_json::to_string(&HistoricalPeriod::SixMonths).unwrap();
        assert_eq!(json, "\"6m\"");
    }

    #[test]
    fn series_total_change_is_last_point() {
        let series = HistoricalSeries {
            symbol: "AAPL".into(),
            points: vec![(date(2025, 1, 1), 0.0), (date(2025, 1, 2), 12.5)],
        };
        assert_eq!(series.total_change(), 12.5);

        let chart = HistoricalChart {
            period: HistoricalPeriod::OneYear,
            series: vec![],
            skipped: vec!["AAPL".into()],
        };
        assert!(chart.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.currency_symbol, "$");
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.default_period, HistoricalPeriod::OneYear);
        assert!(!s.prefer_market_prices);
        assert!(s.api_keys.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = Settings::from_toml_str("request_timeout_secs = 5\n").unwrap();
        assert_eq!(s.request_timeout_secs, 5);
        assert_eq!(s.currency_symbol, "$");
    }

    #[test]
    fn full_toml() {
        let s = Settings::from_toml_str(
            r#"
currency_symbol = "€"
default_period = "6m"
prefer_market_prices = true

[api_keys]
alphavantage = "demo"
"#,
        )
        .unwrap();
        assert_eq!(s.currency_symbol, "€");
        assert_eq!(s.default_period, HistoricalPeriod::SixMonths);
        assert!(s.prefer_market_prices);
        assert_eq!(s.api_key(ALPHA_VANTAGE_KEY_NAME), Some("demo"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = Settings::from_toml_str("request_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn empty_currency_symbol_rejected() {
        let err = Settings::from_toml_str("currency_symbol = \"  \"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Settings::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "currency_symbol = \"£\"").unwrap();
        let s = Settings::load(Some(file.path())).unwrap();
        assert_eq!(s.currency_symbol, "£");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn request_timeout_duration() {
        let s = Settings::default();
        assert_eq!(s.request_timeout(), std::time::Duration::from_secs(30));
    }
}
