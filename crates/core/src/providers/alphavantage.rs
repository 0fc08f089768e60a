use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::holding::AssetCategory;
use crate::models::price::PricePoint;
use super::traits::PriceProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage provider for listed equities and ETFs.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (settings `api_keys.alphavantage` or `ALPHA_VANTAGE_API_KEY`).
/// - Registered after Yahoo Finance, so it only answers when Yahoo fails.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
}

/// Extract the price from a GLOBAL_QUOTE response body.
pub fn parse_global_quote(symbol: &str, body: &str) -> Result<f64, CoreError> {
    let resp: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse quote for {symbol}: {e}"),
    })?;

    let price_str = resp
        .global_quote
        .and_then(|q| q.price)
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}. API limit may be exceeded."),
        })?;

    price_str.trim().parse().map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Invalid price format for {symbol}: {e}"),
    })
}

/// Extract daily closes in `[from, to]` from a TIME_SERIES_DAILY response body.
pub fn parse_daily_series(
    symbol: &str,
    body: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<PricePoint>, CoreError> {
    let resp: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse time series for {symbol}: {e}"),
    })?;

    let series = resp.time_series.ok_or_else(|| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("No time series data for {symbol}. API limit may be exceeded."),
    })?;

    let mut points: Vec<PricePoint> = series
        .iter()
        .filter_map(|(date_str, data)| {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            if date < from || date > to {
                return None;
            }
            let price: f64 = data.close.trim().parse().ok()?;
            Some(PricePoint { date, price })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    Ok(points)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PriceProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_categories(&self) -> Vec<AssetCategory> {
        vec![AssetCategory::Stocks, AssetCategory::Etfs]
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let upper = symbol.to_uppercase();
        let body = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", upper.as_str())])
            .await?;
        parse_global_quote(symbol, &body)
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        // compact = last 100 trading days; anything longer needs the full dump
        let outputsize = if (to - from).num_days() > 140 { "full" } else { "compact" };
        let upper = symbol.to_uppercase();
        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", upper.as_str()),
                ("outputsize", outputsize),
            ])
            .await?;
        parse_daily_series(symbol, &body, from, to)
    }
}

impl AlphaVantageProvider {
    async fn query(&self, params: &[(&str, &str)]) -> Result<String, CoreError> {
        let body = self
            .client
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
