pub mod snapshot;

// Re-export for convenient access (e.g. `use crate::market_data::MarketSnapshot`).
pub use snapshot::{Candle, MarketSnapshot, TickerStats};
