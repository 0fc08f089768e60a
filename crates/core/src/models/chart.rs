use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::holding::AssetCategory;

/// Lookback window for historical charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoricalPeriod {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl HistoricalPeriod {
    pub fn all() -> &'static [HistoricalPeriod] {
        &[
            HistoricalPeriod::OneMonth,
            HistoricalPeriod::ThreeMonths,
            HistoricalPeriod::SixMonths,
            HistoricalPeriod::OneYear,
            HistoricalPeriod::TwoYears,
            HistoricalPeriod::FiveYears,
        ]
    }

    /// Calendar days covered by this period.
    pub fn days(&self) -> i64 {
        match self {
            HistoricalPeriod::OneMonth => 30,
            HistoricalPeriod::ThreeMonths => 91,
            HistoricalPeriod::SixMonths => 182,
            HistoricalPeriod::OneYear => 365,
            HistoricalPeriod::TwoYears => 730,
            HistoricalPeriod::FiveYears => 1826,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoricalPeriod::OneMonth => "1m",
            HistoricalPeriod::ThreeMonths => "3m",
            HistoricalPeriod::SixMonths => "6m",
            HistoricalPeriod::OneYear => "1y",
            HistoricalPeriod::TwoYears => "2y",
            HistoricalPeriod::FiveYears => "5y",
        }
    }

    /// Date range `(from, to)` ending at `to`.
    pub fn range_ending(&self, to: NaiveDate) -> (NaiveDate, NaiveDate) {
        (to - chrono::Duration::days(self.days()), to)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl std::fmt::Display for HistoricalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for HistoricalPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "1mo" => Ok(HistoricalPeriod::OneMonth),
            "3m" | "3mo" => Ok(HistoricalPeriod::ThreeMonths),
            "6m" | "6mo" => Ok(HistoricalPeriod::SixMonths),
            "1y" => Ok(HistoricalPeriod::OneYear),
            "2y" => Ok(HistoricalPeriod::TwoYears),
            "5y" => Ok(HistoricalPeriod::FiveYears),
            other => Err(format!(
                "unknown period '{other}' (expected one of 1m, 3m, 6m, 1y, 2y, 5y)"
            )),
        }
    }
}

/// One slice of the allocation-by-category chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub category: AssetCategory,
    pub value: f64,
    pub percent: f64,
}

/// One bar of the per-asset performance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBar {
    pub symbol: String,
    pub return_pct: f64,
}

impl PerformanceBar {
    pub fn is_gain(&self) -> bool {
        self.return_pct >= 0.0
    }
}

/// One point of the risk vs. return scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnPoint {
    pub symbol: String,
    pub category: AssetCategory,

    /// Annualized volatility in percent
    pub risk_pct: f64,
    pub return_pct: f64,

    /// Current value, used for marker size
    pub value: f64,

    /// True when risk is a proxy because no price history was available
    pub estimated: bool,
}

/// Percent change from the first close, per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl HistoricalSeries {
    /// Change between first and last point, in percent.
    pub fn total_change(&self) -> f64 {
        self.points.last().map(|(_, v)| *v).unwrap_or(0.0)
    }
}

/// Historical comparison chart for a set of symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalChart {
    pub period: HistoricalPeriod,
    pub series: Vec<HistoricalSeries>,

    /// Requested symbols that had no usable history
    pub skipped: Vec<String>,
}

impl HistoricalChart {
    /// True when no requested symbol produced a series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
