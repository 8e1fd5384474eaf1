pub mod client;
pub mod config;
pub mod models;

pub use client::CandleServiceClient;
pub use config::Config;
pub use models::*;
