//! HTTP surface of the candle service.
//!
//! [`app`] builds the full router from an injected [`AppState`], so tests
//! and the binary share exactly the same stack.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
