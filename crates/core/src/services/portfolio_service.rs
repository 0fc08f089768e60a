use crate::errors::CoreError;
use crate::models::analytics::HoldingRow;
use crate::models::holding::{AssetCategory, Holding, HoldingTable};

/// Manages the holdings table: manual entry, removal, filtering, demo data.
///
/// Pure business logic. No I/O, no API calls.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a manually entered holding and add it to the table.
    /// An existing row with the same symbol is merged (see `HoldingTable::upsert`).
    /// Returns `true` when the holding was merged into an existing row.
    pub fn add_holding(&self, table: &mut HoldingTable, holding: Holding) -> Result<bool, CoreError> {
        self.validate_manual_entry(&holding)?;
        Ok(table.upsert(holding))
    }

    /// Remove a holding by symbol (case-insensitive).
    pub fn remove_holding(&self, table: &mut HoldingTable, symbol: &str) -> Result<Holding, CoreError> {
        table
            .remove(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_string()))
    }

    pub fn clear(&self, table: &mut HoldingTable) {
        table.clear();
    }

    /// Distinct categories present in the table, in display order.
    pub fn categories(&self, table: &HoldingTable) -> Vec<AssetCategory> {
        let mut categories: Vec<AssetCategory> = table.iter().map(|h| h.category).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Keep only rows whose category is in `categories`.
    pub fn filter_by_categories(&self, rows: &[HoldingRow], categories: &[AssetCategory]) -> Vec<HoldingRow> {
        rows.iter()
            .filter(|r| categories.contains(&r.category))
            .cloned()
            .collect()
    }

    /// Validation for the manual entry form.
    ///
    /// Rules:
    /// - symbol must not be blank
    /// - quantity and purchase price must be finite and > 0
    /// - a current price, if given, must be finite and > 0
    pub fn validate_manual_entry(&self, holding: &Holding) -> Result<(), CoreError> {
        if holding.symbol.trim().is_empty() {
            return Err(CoreError::Validation("asset name/ticker must not be empty".to_string()));
        }
        if !holding.quantity.is_finite() || holding.quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "quantity for {} must be a positive number, got {}",
                holding.symbol, holding.quantity
            )));
        }
        if !holding.purchase_price.is_finite() || holding.purchase_price <= 0.0 {
            return Err(CoreError::Validation(format!(
                "purchase price for {} must be a positive number, got {}",
                holding.symbol, holding.purchase_price
            )));
        }
        if let Some(price) = holding.current_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::Validation(format!(
                    "current price for {} must be a positive number, got {price}",
                    holding.symbol
                )));
            }
        }
        Ok(())
    }

    /// The demo portfolio shown before the user enters anything.
    pub fn sample_holdings(&self) -> Vec<Holding> {
        [
            ("AAPL", AssetCategory::Stocks, 10.0, 150.0, 180.0),
            ("MSFT", AssetCategory::Stocks, 5.0, 300.0, 350.0),
            ("GOOGL", AssetCategory::Stocks, 2.0, 2800.0, 2900.0),
            ("AMZN", AssetCategory::Stocks, 3.0, 3300.0, 3400.0),
            ("TSLA", AssetCategory::Stocks, 8.0, 800.0, 750.0),
            ("VTI", AssetCategory::Etfs, 15.0, 220.0, 240.0),
            ("AGG", AssetCategory::Bonds, 20.0, 100.0, 102.0),
            ("BTC-USD", AssetCategory::Crypto, 0.5, 35000.0, 40000.0),
            ("ETH-USD", AssetCategory::Crypto, 2.0, 2500.0, 3000.0),
            ("Real Estate", AssetCategory::RealEstate, 1.0, 200000.0, 210000.0),
        ]
        .into_iter()
        .map(|(symbol, category, quantity, purchase, current)| {
            Holding::new(symbol, category, quantity, purchase).with_current_price(current)
        })
        .collect()
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
