use std::collections::HashMap;

use crate::models::analytics::{CategoryAllocation, HoldingRow, PortfolioMetrics};
use crate::models::holding::{AssetCategory, Holding};
use crate::models::price::{PriceQuote, PriceSource};

/// Trading days per year, for annualizing daily volatility.
const TRADING_DAYS: f64 = 252.0;

/// Computes per-holding derived columns and portfolio-level metrics.
///
/// Pure arithmetic: prices come in already resolved, so every function here
/// is synchronous and deterministic. Division by a zero denominator yields 0.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Combine holdings with their quotes into evaluated rows, in input order.
    ///
    /// `quotes` must be parallel to `holdings`; a holding without a quote is
    /// valued as missing.
    pub fn evaluate_rows(&self, holdings: &[Holding], quotes: &[PriceQuote]) -> Vec<HoldingRow> {
        let mut rows: Vec<HoldingRow> = holdings
            .iter()
            .enumerate()
            .map(|(idx, holding)| {
                let quote = quotes.get(idx).cloned().unwrap_or_else(PriceQuote::missing);
                let cost_basis = holding.cost_basis();
                let current_value = holding.quantity * quote.price;
                let gain_loss = current_value - cost_basis;
                HoldingRow {
                    symbol: holding.symbol.clone(),
                    category: holding.category,
                    quantity: holding.quantity,
                    purchase_price: holding.purchase_price,
                    current_price: quote.price,
                    price_source: quote.source,
                    cost_basis,
                    current_value,
                    gain_loss,
                    return_pct: percent_of(gain_loss, cost_basis),
                    weight_pct: 0.0, // filled below
                }
            })
            .collect();

        self.reweight(&mut rows);
        rows
    }

    /// Recompute `weight_pct` against the total value of `rows`.
    /// Called again after category filtering so weights sum to 100 within the view.
    pub fn reweight(&self, rows: &mut [HoldingRow]) {
        let total_value: f64 = rows.iter().map(|r| r.current_value).sum();
        for row in rows.iter_mut() {
            row.weight_pct = percent_of(row.current_value, total_value);
        }
    }

    /// Aggregate metrics over `rows`.
    pub fn compute_metrics(&self, rows: &[HoldingRow]) -> PortfolioMetrics {
        let total_value: f64 = rows.iter().map(|r| r.current_value).sum();
        let total_cost: f64 = rows.iter().map(|r| r.cost_basis).sum();
        let total_gain_loss = total_value - total_cost;

        let weighted_return = if total_value > 0.0 {
            rows.iter()
                .map(|r| (r.current_value / total_value) * r.return_pct)
                .sum()
        } else {
            0.0
        };

        let returns: Vec<f64> = rows.iter().map(|r| r.return_pct).collect();
        let category_allocation = self.category_allocation(rows, total_value);

        let largest_holding = rows
            .iter()
            .map(|r| percent_of(r.current_value, total_value))
            .fold(0.0_f64, f64::max);
        let largest_category = category_allocation
            .iter()
            .map(|c| c.percent)
            .fold(0.0_f64, f64::max);

        PortfolioMetrics {
            total_value,
            total_cost,
            total_gain_loss,
            total_gain_loss_pct: percent_of(total_gain_loss, total_cost),
            weighted_return,
            volatility: sample_std_dev(&returns),
            diversification_score: concentration_score(total_value, largest_holding),
            category_diversification_score: concentration_score(total_value, largest_category),
            category_allocation,
            holding_count: rows.len(),
            missing_prices: rows
                .iter()
                .filter(|r| r.price_source == PriceSource::Missing)
                .count(),
        }
    }

    /// Value per category, largest first. Ties keep category display order.
    pub fn category_allocation(&self, rows: &[HoldingRow], total_value: f64) -> Vec<CategoryAllocation> {
        let mut by_category: HashMap<AssetCategory, f64> = HashMap::new();
        for row in rows {
            *by_category.entry(row.category).or_insert(0.0) += row.current_value;
        }

        let mut allocation: Vec<CategoryAllocation> = by_category
            .into_iter()
            .map(|(category, value)| CategoryAllocation {
                category,
                value,
                percent: percent_of(value, total_value),
            })
            .collect();
        allocation.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.category.cmp(&b.category))
        });
        allocation
    }

    /// Annualized volatility of daily simple returns, in percent.
    ///
    /// Population standard deviation × √252 × 100. Needs at least three
    /// closes (two returns); otherwise 0.
    pub fn annualized_volatility(&self, closes: &[f64]) -> f64 {
        if closes.len() < 3 {
            return 0.0;
        }
        let returns: Vec<f64> = closes
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| w[1] / w[0] - 1.0)
            .collect();
        if returns.len() < 2 {
            return 0.0;
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        variance.sqrt() * TRADING_DAYS.sqrt() * 100.0
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

/// `part / whole × 100`, or 0 when `whole` is not positive.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// `100 − largest weight`; an empty or worthless portfolio scores 0.
fn concentration_score(total_value: f64, largest_pct: f64) -> f64 {
    if total_value > 0.0 {
        (100.0 - largest_pct).max(0.0)
    } else {
        0.0
    }
}

/// Sample standard deviation (n − 1). Fewer than two values → 0.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
