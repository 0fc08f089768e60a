use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::holding::AssetCategory;
use super::price::PriceSource;

/// One evaluated holding: the input columns plus everything derived from the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRow {
    pub symbol: String,
    pub category: AssetCategory,
    pub quantity: f64,
    pub purchase_price: f64,

    /// Price used for valuation (0 when missing)
    pub current_price: f64,
    pub price_source: PriceSource,

    /// quantity × purchase_price
    pub cost_basis: f64,

    /// quantity × current_price
    pub current_value: f64,

    /// current_value − cost_basis
    pub gain_loss: f64,

    /// gain_loss / cost_basis × 100 (0 when cost basis is zero)
    pub return_pct: f64,

    /// Share of total portfolio value, in percent
    pub weight_pct: f64,
}

/// Value held in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub category: AssetCategory,
    pub value: f64,
    pub percent: f64,
}

/// Aggregate statistics over a set of holding rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Σ quantity × current price
    pub total_value: f64,

    /// Σ cost basis
    pub total_cost: f64,

    /// total_value − total_cost
    pub total_gain_loss: f64,

    /// total_gain_loss / total_cost × 100 (0 when total cost is zero)
    pub total_gain_loss_pct: f64,

    /// Value-weighted average of per-holding returns, in percent
    pub weighted_return: f64,

    /// Sample standard deviation of per-holding returns, in percent
    pub volatility: f64,

    /// 100 − largest single-holding weight
    pub diversification_score: f64,

    /// 100 − largest category weight
    pub category_diversification_score: f64,

    /// Per-category value, largest first
    pub category_allocation: Vec<CategoryAllocation>,

    pub holding_count: usize,

    /// Rows valued at zero because no price could be obtained
    pub missing_prices: usize,
}

/// Everything one evaluation pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub as_of: NaiveDate,
    pub rows: Vec<HoldingRow>,
    pub metrics: PortfolioMetrics,

    /// True while the built-in demo portfolio is shown
    pub is_sample: bool,
}
