use std::sync::Arc;

use market_data::{CandleCache, CandleSource, RandomWalkGenerator};
use shared::Config;

/// Shared application state, passed to all route handlers via `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CandleCache>,
    pub source: Arc<dyn CandleSource>,
}

impl AppState {
    /// Empty cache backed by the given candle source.
    pub fn new(source: Arc<dyn CandleSource>) -> Self {
        Self {
            cache: Arc::new(CandleCache::new()),
            source,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let generator = match config.candle_seed {
            Some(seed) => {
                tracing::info!("Using seeded candle generator (seed {})", seed);
                RandomWalkGenerator::seeded(seed)
            }
            None => RandomWalkGenerator::new(),
        };
        Self::new(Arc::new(generator))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(RandomWalkGenerator::new()))
    }
}
