use crate::models::holding::AssetCategory;
use crate::models::settings::{Settings, ALPHA_VANTAGE_KEY_NAME};

use super::alphavantage::AlphaVantageProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;
use super::traits::PriceProvider;

/// Registry of all available price providers.
///
/// Routes requests to providers by `AssetCategory`, in registration order.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default providers configured from `settings`.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: primary, no API key needed.
        // Not available on WASM (uses native reqwest/tokio connectors)
        #[cfg(not(target_arch = "wasm32"))]
        {
            match YahooFinanceProvider::new() {
                Ok(yahoo) => registry.register(Box::new(yahoo)),
                Err(e) => tracing::warn!(error = %e, "Yahoo Finance provider unavailable"),
            }
        }

        // Alpha Vantage: fallback, requires API key
        if let Some(key) = settings.api_key(ALPHA_VANTAGE_KEY_NAME) {
            registry.register(Box::new(AlphaVantageProvider::new(
                key.to_string(),
                settings.request_timeout(),
            )));
        }

        registry
    }

    /// Register a new price provider.
    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        tracing::debug!(provider = provider.name(), "registered price provider");
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given category.
    pub fn get_provider_for(&self, category: &AssetCategory) -> Option<&dyn PriceProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_categories().contains(category))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given category, ordered by registration priority.
    /// Used for fallback: if the first provider fails, try the next one.
    pub fn get_providers_for(&self, category: &AssetCategory) -> Vec<&dyn PriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_categories().contains(category))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
