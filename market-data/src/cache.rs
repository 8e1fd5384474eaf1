//! In-memory candle cache
//!
//! Entries are keyed by `(asset, timeframe)` and live for the lifetime of the
//! owning [`CandleCache`]; nothing is evicted or expired. The requested count
//! only matters on a miss: a hit returns whatever series was stored first.
//!
//! Each key owns a [`OnceCell`]. The map lock is held only long enough to
//! find or create that cell; generation runs on the blocking pool, so a slow
//! or failing key never stalls lookups of other keys. A failed or panicked
//! generation leaves the cell empty and the next request retries it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::candle::CandleSeries;
use crate::generator::{CandleSource, GenerateError};
use crate::timeframe::Timeframe;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("candle generation was cancelled: {0}")]
    Cancelled(String),
}

/// Cache key. The timeframe is the caller's raw label, not the normalized
/// [`Timeframe`], so `"2h"` and `"1m"` are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub asset: String,
    pub timeframe: String,
}

impl CacheKey {
    pub fn new(asset: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.timeframe)
    }
}

/// Result of [`CandleCache::get_or_generate`].
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub series: Arc<CandleSeries>,
    /// `true` when the series was already cached
    pub hit: bool,
}

type Slot = Arc<OnceCell<Arc<CandleSeries>>>;

#[derive(Debug, Default)]
pub struct CandleCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl CandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    // No code panics while holding this guard, but recover anyway so one bad
    // request cannot wedge the cache.
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        Arc::clone(self.entries().entry(key.clone()).or_default())
    }

    /// Return the cached series for `key`, or generate `count` candles from
    /// `source` and store them.
    ///
    /// Concurrent misses on the same key wait on one generation; other keys
    /// proceed independently. A generator panic is resumed on the caller.
    pub async fn get_or_generate<S>(
        &self,
        key: CacheKey,
        count: usize,
        source: Arc<S>,
    ) -> Result<CacheLookup, CacheError>
    where
        S: CandleSource + ?Sized + 'static,
    {
        let slot = self.slot(&key);
        if let Some(series) = slot.get() {
            return Ok(CacheLookup {
                series: Arc::clone(series),
                hit: true,
            });
        }

        let mut generated = false;
        let series = slot
            .get_or_try_init(|| {
                generated = true;
                generate_blocking(source, key, count)
            })
            .await?;

        Ok(CacheLookup {
            series: Arc::clone(series),
            hit: !generated,
        })
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CandleSeries>> {
        self.entries().get(key)?.get().cloned()
    }

    /// Number of distinct `(asset, timeframe)` keys holding a series
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn generate_blocking<S>(
    source: Arc<S>,
    key: CacheKey,
    count: usize,
) -> Result<Arc<CandleSeries>, CacheError>
where
    S: CandleSource + ?Sized + 'static,
{
    let timeframe = Timeframe::from_label(&key.timeframe);
    let joined =
        tokio::task::spawn_blocking(move || source.generate(&key.asset, timeframe, count)).await;

    match joined {
        Ok(series) => Ok(Arc::new(series?)),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(CacheError::Cancelled(e.to_string())),
    }
}
