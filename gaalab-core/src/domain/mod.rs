//! Domain types for GAALab

pub mod period;
pub mod price;
pub mod selection;

pub use period::{rebalance_period, MonthKey};
pub use price::{PricePoint, PriceSeries, PriceTable};
pub use selection::{Holding, Selection, CASH};

/// Symbol type alias
pub type Symbol = String;
