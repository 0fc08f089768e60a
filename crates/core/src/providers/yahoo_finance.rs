use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::holding::AssetCategory;
use crate::models::price::PricePoint;
use super::traits::PriceProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for everything with an exchange ticker.
///
/// - **Free**: No API key required.
/// - **Coverage**: equities, ETFs, bond funds, `BTC-USD` style crypto pairs,
///   futures (`GC=F`).
/// - **Data**: latest quote + daily history.
///
/// Prices are returned in the instrument's native currency.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Midnight UTC of `date` as a `time::OffsetDateTime`.
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let invalid = |e: String| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        };
        let month = time::Month::try_from(date.month() as u8).map_err(|e| invalid(e.to_string()))?;
        let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(day.midnight().assume_utc())
    }

    fn api_error(message: String) -> CoreError {
        CoreError::Api {
            provider: PROVIDER.into(),
            message,
        }
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_categories(&self) -> Vec<AssetCategory> {
        vec![
            AssetCategory::Stocks,
            AssetCategory::Etfs,
            AssetCategory::Bonds,
            AssetCategory::Crypto,
            AssetCategory::Commodities,
            AssetCategory::Other,
        ]
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| Self::api_error(format!("Failed to fetch latest quote for {symbol}: {e}")))?;

        let quote = resp
            .last_quote()
            .map_err(|e| Self::api_error(format!("No quote data for {symbol}: {e}")))?;

        Ok(quote.close)
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + chrono::Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| Self::api_error(format!("Failed to fetch history for {symbol}: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| Self::api_error(format!("Failed to parse quotes for {symbol}: {e}")))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = chrono::DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                (date >= from && date <= to).then_some(PricePoint {
                    date,
                    price: q.close,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);

        Ok(points)
    }
}
