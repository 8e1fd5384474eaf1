use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use market_data::CacheKey;
use serde_json::{json, Value};
use shared::{CandleRequest, CandlesResponse, StatusResponse};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/candles", post(fetch_candles))
        .route("/api/status", get(status))
        .route("/health", get(health_check))
}

/// POST /api/candles — cached series for `asset/timeframe`, generated on a miss.
///
/// The body is parsed whatever its `Content-Type`. On a hit the cached series
/// is returned as-is, even when `count` asks for a different length; that
/// mismatch is logged at `warn`.
async fn fetch_candles(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CandlesResponse>, ApiError> {
    let request: CandleRequest = serde_json::from_slice(&body)?;
    let asset = request
        .asset()
        .ok_or_else(|| ApiError::BadRequest("asset required".to_string()))?;
    let timeframe = request.timeframe_or_default();
    let count = request.count_or_default();

    let key = CacheKey::new(asset, timeframe);
    let lookup = state
        .cache
        .get_or_generate(key.clone(), count, Arc::clone(&state.source))
        .await?;

    if lookup.hit {
        info!("Returning cached candles for {}", key);
        if lookup.series.len() != count {
            warn!(
                "Cached series for {} has {} candles, request asked for {}",
                key,
                lookup.series.len(),
                count
            );
        }
    } else {
        info!("Generated {} candles for {}", lookup.series.len(), key);
    }

    Ok(Json(CandlesResponse::new(lookup.series)))
}

/// GET /api/status
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::ready(state.cache.len()))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
