//! Ordered provider chain.
//!
//! Every provider is tried in order until one succeeds. Unavailable
//! providers (tripped breaker, missing import directory) are skipped. The
//! call fails only when every provider has failed.

use super::provider::{DataError, FetchResult, PriceProvider};
use chrono::NaiveDate;
use tracing::{debug, warn};

#[derive(Default)]
pub struct FallbackProvider {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl FallbackProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl PriceProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn push(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl PriceProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback_chain"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let mut tried = Vec::new();
        let mut last_error = None;

        for provider in &self.providers {
            if !provider.is_available() {
                debug!(provider = provider.name(), symbol, "provider unavailable, skipping");
                continue;
            }
            tried.push(provider.name().to_string());
            match provider.fetch(symbol, start, end) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(provider = provider.name(), symbol, error = %e, "fetch failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(DataError::AllProvidersFailed {
                symbol: symbol.to_string(),
                tried,
                last: Box::new(last),
            }),
            None => Err(DataError::NoProviderAvailable),
        }
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}
