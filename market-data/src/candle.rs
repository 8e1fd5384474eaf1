//! OHLCV candle data structures

use serde::{Deserialize, Serialize};

/// OHLCV candle data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, milliseconds since the Unix epoch (UTC)
    pub time: i64,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High/low bracket the body and volume is non-negative
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
    }

    /// Check if candle is bullish
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Get body size (absolute difference between open and close)
    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Get total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Collection of candles, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of candles
    pub fn from_vec(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Get first (oldest) candle
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Get last (newest) candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.candles.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// Spacing between consecutive candles in milliseconds, if the series
    /// has at least two candles and they are evenly spaced.
    pub fn step_ms(&self) -> Option<i64> {
        let mut gaps = self.candles.windows(2).map(|w| w[1].time - w[0].time);
        let first = gaps.next()?;
        gaps.all(|g| g == first).then_some(first)
    }

    pub fn into_vec(self) -> Vec<Candle> {
        self.candles
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_vec(candles)
    }
}
