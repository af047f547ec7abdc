//! Price data: provider boundary, vendor implementations, universe, table assembly.

pub mod circuit_breaker;
pub mod csv_import;
pub mod fallback;
pub mod fetch;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvPriceProvider;
pub use fallback::FallbackProvider;
pub use fetch::{fetch_table, FetchReport};
pub use provider::{DataError, DataSource, FetchResult, PriceProvider};
pub use synthetic::SyntheticProvider;
pub use universe::{Instrument, Universe};
pub use yahoo::YahooProvider;
