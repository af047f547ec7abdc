//! Provider chain assembly from the data settings.

use std::sync::Arc;

use gaalab_core::data::{
    CircuitBreaker, CsvPriceProvider, DataError, FallbackProvider, SyntheticProvider,
    YahooProvider,
};
use tracing::{info, warn};

use crate::config::DataConfig;

/// Yahoo (unless offline), then the CSV directory, then synthetic prices.
pub fn provider_chain(data: &DataConfig) -> Result<FallbackProvider, DataError> {
    let mut chain = FallbackProvider::new();
    if !data.offline {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        chain.push(Box::new(YahooProvider::new(breaker)?));
    }
    if let Some(dir) = &data.csv_dir {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "csv import directory does not exist");
        }
        chain.push(Box::new(CsvPriceProvider::new(dir)));
    }
    if data.synthetic {
        warn!("synthetic prices enabled; signals will not reflect the market");
        chain.push(Box::new(SyntheticProvider::default()));
    }
    info!(providers = ?chain.names(), "provider chain ready");
    Ok(chain)
}
