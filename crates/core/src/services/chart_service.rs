use std::collections::HashMap;

use crate::models::analytics::{HoldingRow, PortfolioMetrics};
use crate::models::chart::{
    AllocationSlice, HistoricalChart, HistoricalPeriod, HistoricalSeries, PerformanceBar,
    RiskReturnPoint,
};
use crate::models::price::PricePoint;
use crate::services::analytics_service::AnalyticsService;

/// Number of assets pre-selected for the historical comparison.
const DEFAULT_HISTORY_SELECTION: usize = 3;

/// Turns evaluated rows and price histories into chart-ready data sets.
///
/// The core computes all the numbers; the terminal front ends only draw.
pub struct ChartService {
    analytics_service: AnalyticsService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            analytics_service: AnalyticsService::new(),
        }
    }

    /// Allocation by category (largest first).
    pub fn allocation_chart(&self, metrics: &PortfolioMetrics) -> Vec<AllocationSlice> {
        metrics
            .category_allocation
            .iter()
            .map(|c| AllocationSlice {
                category: c.category,
                value: c.value,
                percent: c.percent,
            })
            .collect()
    }

    /// Per-asset return, worst first.
    pub fn performance_chart(&self, rows: &[HoldingRow]) -> Vec<PerformanceBar> {
        let mut bars: Vec<PerformanceBar> = rows
            .iter()
            .map(|r| PerformanceBar {
                symbol: r.symbol.clone(),
                return_pct: r.return_pct,
            })
            .collect();
        bars.sort_by(|a, b| {
            a.return_pct
                .partial_cmp(&b.return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        bars
    }

    /// Risk vs. return scatter.
    ///
    /// Risk is the annualized volatility of the symbol's history (keyed by
    /// uppercase symbol). Without at least three closes the risk falls back
    /// to the proxy `|return| / 10` and the point is flagged `estimated`.
    pub fn risk_return(
        &self,
        rows: &[HoldingRow],
        histories: &HashMap<String, Vec<PricePoint>>,
    ) -> Vec<RiskReturnPoint> {
        rows.iter()
            .map(|row| {
                let closes: Vec<f64> = histories
                    .get(&row.symbol.to_uppercase())
                    .map(|points| points.iter().map(|p| p.price).collect())
                    .unwrap_or_default();

                let (risk_pct, estimated) = if closes.len() >= 3 {
                    (self.analytics_service.annualized_volatility(&closes), false)
                } else {
                    (row.return_pct.abs() / 10.0, true)
                };

                RiskReturnPoint {
                    symbol: row.symbol.clone(),
                    category: row.category,
                    risk_pct,
                    return_pct: row.return_pct,
                    value: row.current_value,
                    estimated,
                }
            })
            .collect()
    }

    /// Percent-change-from-start series for each requested symbol.
    ///
    /// Symbols with no history, or whose first close is not positive, are
    /// listed in `skipped`. Output order follows `symbols`.
    pub fn historical_chart(
        &self,
        symbols: &[String],
        histories: &HashMap<String, Vec<PricePoint>>,
        period: HistoricalPeriod,
    ) -> HistoricalChart {
        let mut series = Vec::new();
        let mut skipped = Vec::new();

        for symbol in symbols {
            let points = histories
                .get(&symbol.to_uppercase())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            match normalize(points) {
                Some(normalized) => series.push(HistoricalSeries {
                    symbol: symbol.clone(),
                    points: normalized,
                }),
                None => skipped.push(symbol.clone()),
            }
        }

        HistoricalChart {
            period,
            series,
            skipped,
        }
    }

    /// First few symbols in alphabetical order, the initial history selection.
    pub fn default_history_selection(&self, rows: &[HoldingRow]) -> Vec<String> {
        let mut symbols: Vec<String> = rows.iter().map(|r| r.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        symbols.truncate(DEFAULT_HISTORY_SELECTION);
        symbols
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// `(p / p₀ − 1) × 100` for each point; `None` when there is no valid base.
fn normalize(points: &[PricePoint]) -> Option<Vec<(chrono::NaiveDate, f64)>> {
    let base = points.first()?.price;
    if !base.is_finite() || base <= 0.0 {
        return None;
    }
    Some(
        points
            .iter()
            .map(|p| (p.date, (p.price / base - 1.0) * 100.0))
            .collect(),
    )
}
