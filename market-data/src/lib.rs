//! Market data for the candle service
//!
//! There is no upstream exchange behind this crate: every series is
//! synthesized by a random walk and kept in an in-memory cache for the
//! lifetime of the process.
//!
//! # Features
//!
//! - **Candles**: OHLCV records and ordered candle series
//! - **Timeframes**: `1m`, `5m` and `15m` step sizes with a `1m` fallback
//! - **Generator**: random-walk series with injectable randomness and clock
//! - **Cache**: insert-if-absent store keyed by `asset/timeframe`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use market_data::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CacheError> {
//!     let cache = CandleCache::new();
//!     let source = Arc::new(RandomWalkGenerator::seeded(7));
//!     let lookup = cache
//!         .get_or_generate(CacheKey::new("EURUSD", "5m"), 10, source)
//!         .await?;
//!     assert_eq!(lookup.series.len(), 10);
//!     assert!(!lookup.hit);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod candle;
pub mod generator;
pub mod timeframe;

pub use cache::*;
pub use candle::*;
pub use generator::*;
pub use timeframe::*;

// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheError, CacheKey, CacheLookup, CandleCache};
    pub use crate::candle::{Candle, CandleSeries};
    pub use crate::generator::{generate_series, CandleSource, GenerateError, RandomWalkGenerator};
    pub use crate::timeframe::Timeframe;
}
