pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;

use std::collections::HashMap;

use models::{
    analytics::{HoldingRow, PortfolioReport},
    chart::{AllocationSlice, HistoricalChart, HistoricalPeriod, PerformanceBar, RiskReturnPoint},
    holding::{AssetCategory, Holding, HoldingTable},
    price::PricePoint,
    settings::Settings,
};
use providers::registry::PriceProviderRegistry;
use services::{
    analytics_service::AnalyticsService,
    chart_service::ChartService,
    import_service::{ImportReport, ImportService},
    portfolio_service::PortfolioService,
    price_service::PriceService,
};

use errors::CoreError;

/// Main entry point for the Portfolio Analyzer core library.
///
/// Holds the holdings table and the services that evaluate it. Every
/// evaluation is a fresh, sequential pass: fetch prices → compute rows →
/// aggregate. Nothing is cached between calls.
#[must_use]
pub struct PortfolioAnalyzer {
    holdings: HoldingTable,
    settings: Settings,
    /// True while the table holds the untouched demo portfolio.
    is_sample: bool,
    portfolio_service: PortfolioService,
    import_service: ImportService,
    price_service: PriceService,
    analytics_service: AnalyticsService,
    chart_service: ChartService,
}

impl std::fmt::Debug for PortfolioAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioAnalyzer")
            .field("holdings", &self.holdings.len())
            .field("is_sample", &self.is_sample)
            .field("settings", &self.settings)
            .finish()
    }
}

impl PortfolioAnalyzer {
    /// Empty analyzer with the default providers for `settings`.
    pub fn new(settings: Settings) -> Self {
        let registry = PriceProviderRegistry::new_with_defaults(&settings);
        Self::with_registry(settings, registry)
    }

    /// Empty analyzer with a caller-supplied provider registry.
    pub fn with_registry(settings: Settings, registry: PriceProviderRegistry) -> Self {
        Self {
            holdings: HoldingTable::new(),
            settings,
            is_sample: false,
            portfolio_service: PortfolioService::new(),
            import_service: ImportService::new(),
            price_service: PriceService::new(registry),
            analytics_service: AnalyticsService::new(),
            chart_service: ChartService::new(),
        }
    }

    /// Analyzer pre-loaded with the demo portfolio.
    pub fn with_sample_data(settings: Settings) -> Self {
        let mut analyzer = Self::new(settings);
        analyzer.load_sample();
        analyzer
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a manually entered holding (validated). Merges into an existing
    /// row with the same symbol; returns `true` when it merged.
    pub fn add_holding(&mut self, holding: Holding) -> Result<bool, CoreError> {
        let merged = self
            .portfolio_service
            .add_holding(&mut self.holdings, holding)?;
        self.is_sample = false;
        Ok(merged)
    }

    /// Remove a holding by symbol (case-insensitive).
    pub fn remove_holding(&mut self, symbol: &str) -> Result<Holding, CoreError> {
        let removed = self
            .portfolio_service
            .remove_holding(&mut self.holdings, symbol)?;
        self.is_sample = false;
        Ok(removed)
    }

    /// Remove every holding.
    pub fn clear_holdings(&mut self) {
        self.portfolio_service.clear(&mut self.holdings);
        self.is_sample = false;
    }

    /// Replace the table with the demo portfolio.
    pub fn load_sample(&mut self) {
        self.holdings = HoldingTable::from_holdings(self.portfolio_service.sample_holdings());
        self.is_sample = true;
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        self.holdings.as_slice()
    }

    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.is_sample
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Distinct categories present, in display order.
    #[must_use]
    pub fn categories(&self) -> Vec<AssetCategory> {
        self.portfolio_service.categories(&self.holdings)
    }

    // ── Import / Export ─────────────────────────────────────────────

    /// Replace the table with holdings parsed from CSV text.
    ///
    /// On a header error the current table is left untouched.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let report = self.import_service.parse_holdings_csv(text)?;
        self.holdings = HoldingTable::from_holdings(report.holdings.clone());
        self.is_sample = false;
        Ok(report)
    }

    /// Import a CSV file from disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn import_csv_file(&mut self, path: &std::path::Path) -> Result<ImportReport, CoreError> {
        let text = std::fs::read_to_string(path)?;
        self.import_csv(&text)
    }

    /// Current holdings in the import format.
    pub fn export_csv(&self) -> Result<String, CoreError> {
        self.import_service.holdings_to_csv(self.holdings.as_slice())
    }

    /// Two-row starter file.
    pub fn template_csv(&self) -> Result<String, CoreError> {
        self.import_service.template_csv()
    }

    // ── Evaluation ──────────────────────────────────────────────────

    /// Price every holding and compute rows and metrics.
    ///
    /// With `filter`, only rows in those categories are kept and weights are
    /// recomputed within the filtered view. Price failures never fail this
    /// call; they show up as `PriceSource::Missing` rows valued at zero.
    pub async fn evaluate(&self, filter: Option<&[AssetCategory]>) -> PortfolioReport {
        let holdings = self.holdings.as_slice();
        let quotes = self
            .price_service
            .quote_all(holdings, self.settings.prefer_market_prices)
            .await;

        let mut rows = self.analytics_service.evaluate_rows(holdings, &quotes);
        if let Some(categories) = filter {
            rows = self.portfolio_service.filter_by_categories(&rows, categories);
            self.analytics_service.reweight(&mut rows);
        }
        let metrics = self.analytics_service.compute_metrics(&rows);

        PortfolioReport {
            as_of: chrono::Utc::now().date_naive(),
            rows,
            metrics,
            is_sample: self.is_sample,
        }
    }

    /// Allocation-by-category chart data for a report.
    #[must_use]
    pub fn allocation_chart(&self, report: &PortfolioReport) -> Vec<AllocationSlice> {
        self.chart_service.allocation_chart(&report.metrics)
    }

    /// Per-asset performance chart data for a report, worst first.
    #[must_use]
    pub fn performance_chart(&self, report: &PortfolioReport) -> Vec<PerformanceBar> {
        self.chart_service.performance_chart(&report.rows)
    }

    /// Risk vs. return scatter, using one year of history per row.
    pub async fn risk_return(&self, rows: &[HoldingRow]) -> Vec<RiskReturnPoint> {
        let symbols: Vec<String> = rows.iter().map(|r| r.symbol.clone()).collect();
        let histories = self.price_histories(&symbols, HistoricalPeriod::OneYear).await;
        self.chart_service.risk_return(rows, &histories)
    }

    /// Normalized price history for the selected symbols.
    ///
    /// Symbols that are not in the portfolio, not tradable, or have no data
    /// end up in `HistoricalChart::skipped`.
    pub async fn historical_chart(&self, symbols: &[String], period: HistoricalPeriod) -> HistoricalChart {
        let histories = self.price_histories(symbols, period).await;
        self.chart_service.historical_chart(symbols, &histories, period)
    }

    /// Symbols pre-selected for the historical chart.
    #[must_use]
    pub fn default_history_selection(&self, report: &PortfolioReport) -> Vec<String> {
        self.chart_service.default_history_selection(&report.rows)
    }

    /// Names of providers that can quote a category, in fallback order.
    #[must_use]
    pub fn provider_names(&self, category: &AssetCategory) -> Vec<String> {
        self.price_service.get_provider_names(category)
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Fetch history for each symbol held in the portfolio, keyed by uppercase symbol.
    async fn price_histories(
        &self,
        symbols: &[String],
        period: HistoricalPeriod,
    ) -> HashMap<String, Vec<PricePoint>> {
        let (from, to) = period.range_ending(chrono::Utc::now().date_naive());
        let mut histories = HashMap::new();

        for symbol in symbols {
            let Some(holding) = self.holdings.get(symbol) else {
                tracing::debug!(%symbol, "not in portfolio, skipping history");
                continue;
            };
            let key = holding.key();
            if histories.contains_key(&key) {
                continue;
            }
            let points = self
                .price_service
                .history(&holding.symbol, &holding.category, from, to)
                .await;
            histories.insert(key, points);
        }

        histories
    }
}
