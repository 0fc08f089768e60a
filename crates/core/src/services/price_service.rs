use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::holding::{AssetCategory, Holding};
use crate::models::price::{PricePoint, PriceQuote};
use crate::providers::registry::PriceProviderRegistry;

/// Resolves current and historical prices for holdings.
///
/// Every lookup degrades instead of failing: a quote falls back to the
/// manual price and then to a zero-valued `Missing`, and a history falls
/// back to an empty series. Providers are tried in registration order;
/// there is no retry and no cache, so each call is a fresh lookup.
pub struct PriceService {
    registry: PriceProviderRegistry,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self { registry }
    }

    /// Names of all providers for a category, in fallback order.
    pub fn get_provider_names(&self, category: &AssetCategory) -> Vec<String> {
        self.registry
            .get_providers_for(category)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Resolve the current price of a holding.
    ///
    /// 1. A manual price wins unless `prefer_market` is set.
    /// 2. Non-tradable holdings never reach a provider.
    /// 3. Providers are tried in order; the first finite, non-negative price wins.
    /// 4. If all fail: manual price if present, else `Missing` (price 0).
    pub async fn quote(&self, holding: &Holding, prefer_market: bool) -> PriceQuote {
        let fallback = || match holding.current_price {
            Some(price) => PriceQuote::manual(price),
            None => PriceQuote::missing(),
        };

        if holding.current_price.is_some() && !prefer_market {
            return fallback();
        }
        if !holding.is_tradable() {
            tracing::debug!(symbol = %holding.symbol, "not tradable, skipping market lookup");
            return fallback();
        }

        match self.market_price(holding).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::debug!(symbol = %holding.symbol, error = %e, "using fallback price");
                fallback()
            }
        }
    }

    /// Ask the providers for a holding's category, in order, for a market price.
    ///
    /// Fails with `NoProvider` when the category has no provider and with
    /// `PriceNotAvailable` when every provider fails or returns a non-finite
    /// or negative price.
    pub async fn market_price(&self, holding: &Holding) -> Result<PriceQuote, CoreError> {
        let providers = self.registry.get_providers_for(&holding.category);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(holding.category.to_string()));
        }

        for provider in &providers {
            tracing::debug!(symbol = %holding.symbol, provider = provider.name(), "fetching quote");
            match provider.get_current_price(&holding.symbol).await {
                Ok(price) if price.is_finite() && price >= 0.0 => {
                    return Ok(PriceQuote::market(price, provider.name()));
                }
                Ok(price) => {
                    tracing::warn!(
                        symbol = %holding.symbol,
                        provider = provider.name(),
                        price,
                        "provider returned an invalid price"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        symbol = %holding.symbol,
                        provider = provider.name(),
                        error = %e,
                        "quote lookup failed"
                    );
                }
            }
        }

        Err(CoreError::PriceNotAvailable {
            symbol: holding.symbol.clone(),
            date: chrono::Utc::now().date_naive().to_string(),
        })
    }

    /// Resolve quotes for all holdings, in input order.
    pub async fn quote_all(&self, holdings: &[Holding], prefer_market: bool) -> Vec<PriceQuote> {
        let mut quotes = Vec::with_capacity(holdings.len());
        for holding in holdings {
            quotes.push(self.quote(holding, prefer_market).await);
        }
        quotes
    }

    /// Fetch daily closes for a symbol over `[from, to]`.
    ///
    /// Returns an empty series for non-tradable symbols or when every
    /// provider fails. Output is sorted by date; non-finite and
    /// non-positive closes are dropped.
    pub async fn history(
        &self,
        symbol: &str,
        category: &AssetCategory,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<PricePoint> {
        if !category.is_market_traded() || !crate::models::holding::is_tradable(symbol) {
            return Vec::new();
        }

        for provider in self.registry.get_providers_for(category) {
            tracing::debug!(symbol, provider = provider.name(), %from, %to, "fetching history");
            match provider.get_price_range(symbol, from, to).await {
                Ok(mut points) => {
                    points.retain(|p| p.price.is_finite() && p.price > 0.0);
                    if points.is_empty() {
                        tracing::warn!(symbol, provider = provider.name(), "empty history");
                        continue;
                    }
                    points.sort_by_key(|p| p.date);
                    return points;
                }
                Err(e) => {
                    tracing::warn!(
                        symbol,
                        provider = provider.name(),
                        error = %e,
                        "history lookup failed"
                    );
                }
            }
        }

        Vec::new()
    }
}
