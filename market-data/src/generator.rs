//! Synthetic candle generation
//!
//! Series are produced by a random walk: each candle opens near the previous
//! close and its close carries forward as the next base price. The asset name
//! does not influence the output.

use std::collections::TryReserveError;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::candle::{Candle, CandleSeries};
use crate::timeframe::Timeframe;

const BASE_PRICE_MIN: f64 = 100.0;
const BASE_PRICE_MAX: f64 = 10_000.0;
const OPEN_JITTER: f64 = 50.0;
const BODY_JITTER: f64 = 100.0;
const WICK_MAX: f64 = 50.0;
const VOLUME_MIN: f64 = 1_000.0;
const VOLUME_MAX: f64 = 100_000.0;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot allocate {count} candles: {source}")]
    Allocation {
        count: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Something that can produce a candle series on demand.
pub trait CandleSource: Send + Sync {
    fn generate(
        &self,
        asset: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, GenerateError>;
}

/// Build `count` candles spaced one `timeframe` step apart, the newest one
/// step before `now_ms`, oldest first.
///
/// The whole series is reserved up front; a count whose storage cannot be
/// allocated fails with [`GenerateError::Allocation`] instead of aborting.
pub fn generate_series<R: Rng + ?Sized>(
    rng: &mut R,
    timeframe: Timeframe,
    count: usize,
    now_ms: i64,
) -> Result<CandleSeries, GenerateError> {
    let mut candles = Vec::new();
    candles
        .try_reserve_exact(count)
        .map_err(|source| GenerateError::Allocation { count, source })?;

    let step_ms = timeframe.step_ms();
    let mut base_price = rng.gen_range(BASE_PRICE_MIN..=BASE_PRICE_MAX);

    for steps_back in (1..=count).rev() {
        let offset = i64::try_from(steps_back)
            .unwrap_or(i64::MAX)
            .saturating_mul(step_ms);
        let time = now_ms.saturating_sub(offset);

        let open = base_price + rng.gen_range(-OPEN_JITTER..=OPEN_JITTER);
        let close = open + rng.gen_range(-BODY_JITTER..=BODY_JITTER);
        let high = open.max(close) + rng.gen_range(0.0..=WICK_MAX);
        let low = open.min(close) - rng.gen_range(0.0..=WICK_MAX);
        let volume = rng.gen_range(VOLUME_MIN..=VOLUME_MAX);

        candles.push(Candle::new(time, open, high, low, close, volume));
        base_price = close;
    }

    Ok(CandleSeries::from_vec(candles))
}

/// Default [`CandleSource`]: random walk over the wall clock.
///
/// An unseeded generator draws from the thread-local entropy RNG. A seeded
/// one derives a fresh `StdRng` per call from the base seed and a call
/// counter, so the sequence of series it returns is reproducible.
#[derive(Debug, Default)]
pub struct RandomWalkGenerator {
    seed: Option<u64>,
    calls: AtomicU64,
}

impl RandomWalkGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            calls: AtomicU64::new(0),
        }
    }
}

impl CandleSource for RandomWalkGenerator {
    fn generate(
        &self,
        asset: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, GenerateError> {
        let now_ms = Utc::now().timestamp_millis();
        let series = match self.seed {
            Some(seed) => {
                let call = self.calls.fetch_add(1, Ordering::Relaxed);
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(call));
                generate_series(&mut rng, timeframe, count, now_ms)
            }
            None => generate_series(&mut rand::thread_rng(), timeframe, count, now_ms),
        }?;
        debug!(asset, %timeframe, count, "generated candle series");
        Ok(series)
    }
}
