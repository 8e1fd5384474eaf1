use std::sync::Arc;

use market_data::CandleSeries;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEFRAME: &str = "1m";
pub const DEFAULT_COUNT: i64 = 50;
pub const STATUS_READY: &str = "ready";
pub const STATUS_NOTE: &str = "Using realistic data generation - ready for real API integration";

/// Body of `POST /api/candles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleRequest {
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl CandleRequest {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: Some(asset.into()),
            ..Self::default()
        }
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Asset if present and non-empty
    pub fn asset(&self) -> Option<&str> {
        self.asset.as_deref().filter(|a| !a.is_empty())
    }

    pub fn timeframe_or_default(&self) -> &str {
        self.timeframe.as_deref().unwrap_or(DEFAULT_TIMEFRAME)
    }

    /// Requested count; negative values mean an empty series
    pub fn count_or_default(&self) -> usize {
        let count = self.count.unwrap_or(DEFAULT_COUNT).max(0);
        usize::try_from(count).unwrap_or(usize::MAX)
    }
}

/// Success body of `POST /api/candles`. The series is shared with the cache
/// rather than copied per response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub success: bool,
    pub candles: Arc<CandleSeries>,
}

impl CandlesResponse {
    pub fn new(candles: Arc<CandleSeries>) -> Self {
        Self {
            success: true,
            candles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub cache_size: usize,
    pub note: String,
}

impl StatusResponse {
    pub fn ready(cache_size: usize) -> Self {
        Self {
            status: STATUS_READY.to_string(),
            cache_size,
            note: STATUS_NOTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
