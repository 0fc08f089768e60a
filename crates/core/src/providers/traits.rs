use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::holding::AssetCategory;
use crate::models::price::PricePoint;

/// Trait abstraction for all market-data providers.
///
/// Each API (Yahoo Finance, Alpha Vantage) implements this trait, so the
/// services only ever see `dyn PriceProvider` and tests can swap in mocks.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs and price sources).
    fn name(&self) -> &str;

    /// Which asset categories this provider can quote.
    fn supported_categories(&self) -> Vec<AssetCategory>;

    /// Get the latest price of a symbol, in its native currency.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Get daily closes for a date range (inclusive), sorted by date.
    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
