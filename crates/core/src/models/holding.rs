use serde::{Deserialize, Serialize};

/// The category of a held asset.
/// Determines which price provider (if any) is asked for market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    Stocks,
    Etfs,
    Bonds,
    Crypto,
    RealEstate,
    Commodities,
    Cash,
    Other,
}

impl AssetCategory {
    /// All categories in display order.
    pub fn all() -> &'static [AssetCategory] {
        &[
            AssetCategory::Stocks,
            AssetCategory::Etfs,
            AssetCategory::Bonds,
            AssetCategory::Crypto,
            AssetCategory::RealEstate,
            AssetCategory::Commodities,
            AssetCategory::Cash,
            AssetCategory::Other,
        ]
    }

    /// Lenient parse used by CSV import: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(AssetCategory::Other)
    }

    /// Whether quotes for this category can come from a market-data API at all.
    pub fn is_market_traded(&self) -> bool {
        !matches!(self, AssetCategory::RealEstate | AssetCategory::Cash)
    }

    /// Next category in display order (wraps around). Used by form pickers.
    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Previous category in display order (wraps around).
    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetCategory::Stocks => write!(f, "Stocks"),
            AssetCategory::Etfs => write!(f, "ETFs"),
            AssetCategory::Bonds => write!(f, "Bonds"),
            AssetCategory::Crypto => write!(f, "Crypto"),
            AssetCategory::RealEstate => write!(f, "Real Estate"),
            AssetCategory::Commodities => write!(f, "Commodities"),
            AssetCategory::Cash => write!(f, "Cash"),
            AssetCategory::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "stock" | "stocks" | "equity" | "equities" => Ok(AssetCategory::Stocks),
            "etf" | "etfs" => Ok(AssetCategory::Etfs),
            "bond" | "bonds" => Ok(AssetCategory::Bonds),
            "crypto" | "cryptocurrency" => Ok(AssetCategory::Crypto),
            "realestate" => Ok(AssetCategory::RealEstate),
            "commodity" | "commodities" => Ok(AssetCategory::Commodities),
            "cash" => Ok(AssetCategory::Cash),
            "other" => Ok(AssetCategory::Other),
            _ => Err(format!("unknown asset category '{s}'")),
        }
    }
}

/// A single owned asset: ticker, category, quantity and cost.
///
/// Holdings are keyed by `symbol`, compared case-insensitively. The symbol
/// itself keeps the case it was entered with, so free-form names like
/// "Real Estate" survive unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker or free-form asset name, trimmed
    pub symbol: String,

    pub category: AssetCategory,

    /// Units held (non-negative)
    pub quantity: f64,

    /// Price paid per unit (non-negative)
    pub purchase_price: f64,

    /// Manually entered current price; `None` means "ask the market"
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl Holding {
    pub fn new(
        symbol: impl Into<String>,
        category: AssetCategory,
        quantity: f64,
        purchase_price: f64,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            category,
            quantity,
            purchase_price,
            current_price: None,
        }
    }

    /// Attach a manual current price.
    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Total amount paid: quantity × purchase price.
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    /// Case-insensitive key used for lookups and merging.
    pub fn key(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Whether this holding should be sent to a market-data provider.
    pub fn is_tradable(&self) -> bool {
        self.category.is_market_traded() && is_tradable(&self.symbol)
    }
}

/// Heuristic for "looks like an exchange ticker".
///
/// Accepts `BTC-USD` style pairs and all-caps tickers (`AAPL`, `BRK.B`,
/// `GC=F`); rejects free-form names like "Real Estate" or "my house".
pub fn is_tradable(symbol: &str) -> bool {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return false;
    }
    if symbol.contains('-') {
        return true;
    }
    symbol.chars().any(|c| c.is_alphabetic()) && !symbol.chars().any(char::is_lowercase)
}

/// Ordered table of holdings. Preserves the order in which rows were entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingTable {
    rows: Vec<Holding>,
}

impl HoldingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        let mut table = Self::new();
        for holding in holdings {
            table.upsert(holding);
        }
        table
    }

    /// Insert a holding, or merge it into an existing row with the same symbol.
    ///
    /// Merging sums quantities and cost bases, so the per-unit purchase price
    /// becomes the quantity-weighted average. A newly supplied manual current
    /// price replaces the previous one. The first-seen category and symbol
    /// spelling are kept. Returns `true` when a merge happened.
    pub fn upsert(&mut self, holding: Holding) -> bool {
        let key = holding.key();
        match self.rows.iter_mut().find(|h| h.key() == key) {
            Some(existing) => {
                let quantity = existing.quantity + holding.quantity;
                let cost = existing.cost_basis() + holding.cost_basis();
                existing.purchase_price = if quantity > 0.0 { cost / quantity } else { 0.0 };
                existing.quantity = quantity;
                if holding.current_price.is_some() {
                    existing.current_price = holding.current_price;
                }
                true
            }
            None => {
                self.rows.push(holding);
                false
            }
        }
    }

    /// Remove a holding by symbol (case-insensitive).
    pub fn remove(&mut self, symbol: &str) -> Option<Holding> {
        let key = symbol.trim().to_uppercase();
        let idx = self.rows.iter().position(|h| h.key() == key)?;
        Some(self.rows.remove(idx))
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        let key = symbol.trim().to_uppercase();
        self.rows.iter().find(|h| h.key() == key)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[Holding] {
        &self.rows
    }
}

impl<'a> IntoIterator for &'a HoldingTable {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
