use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single price data point (date → close).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Where a holding's current price came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// Entered by the user (form or CSV "Current Price" column)
    Manual,
    /// Fetched from a market-data provider
    Market { provider: String },
    /// No price could be obtained; valued at zero
    Missing,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Manual => write!(f, "manual"),
            PriceSource::Market { provider } => write!(f, "{provider}"),
            PriceSource::Missing => write!(f, "missing"),
        }
    }
}

/// A resolved current price for one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub source: PriceSource,
}

impl PriceQuote {
    pub fn manual(price: f64) -> Self {
        Self {
            price,
            source: PriceSource::Manual,
        }
    }

    pub fn market(price: f64, provider: impl Into<String>) -> Self {
        Self {
            price,
            source: PriceSource::Market {
                provider: provider.into(),
            },
        }
    }

    /// The degraded default: zero price, marked missing.
    pub fn missing() -> Self {
        Self {
            price: 0.0,
            source: PriceSource::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.source == PriceSource::Missing
    }
}
