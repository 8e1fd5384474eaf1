use std::sync::Arc;

use anyhow::{anyhow, Result};
use market_data::Candle;
use reqwest::StatusCode;

use crate::models::{CandleRequest, CandlesResponse, ErrorResponse, StatusResponse};

/// Client for the candle service's HTTP API
#[derive(Debug, Clone)]
pub struct CandleServiceClient {
    pub base_url: String,
    http: reqwest::Client,
}

impl CandleServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn get_candles(&self, asset: &str, timeframe: &str, count: i64) -> Result<Vec<Candle>> {
        let request = CandleRequest::new(asset)
            .with_timeframe(timeframe)
            .with_count(count);

        let response = self
            .http
            .post(format!("{}/api/candles", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_body(status, &response.text().await?));
        }

        let body: CandlesResponse = response.json().await?;
        tracing::debug!("Received {} candles for {}/{}", body.candles.len(), asset, timeframe);
        Ok(Arc::unwrap_or_clone(body.candles).into_vec())
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self
            .http
            .get(format!("{}/api/status", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_body(status, &response.text().await?));
        }

        Ok(response.json().await?)
    }
}

fn error_from_body(status: StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => anyhow!("candle service returned {}: {}", status, err.error),
        Err(_) => anyhow!("candle service returned {}: {}", status, body),
    }
}
