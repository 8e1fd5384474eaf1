use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;

/// Service configuration.
///
/// The service is meant to listen on the fixed loopback address
/// `127.0.0.1:5001`. `BIND_ADDR`, `PORT` and `CANDLE_SEED` are optional
/// overrides; with none of them set, [`Config::from_env`] reproduces exactly
/// that fixed binding and an unseeded generator.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Fixes the generator's randomness when set
    pub candle_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            candle_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            port: match std::env::var("PORT") {
                Ok(port) => port.trim().parse().context("PORT must be a valid port number")?,
                Err(_) => DEFAULT_PORT,
            },
            candle_seed: match std::env::var("CANDLE_SEED") {
                Ok(seed) => Some(seed.trim().parse().context("CANDLE_SEED must be an unsigned integer")?),
                Err(_) => None,
            },
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind_addr, self.port))
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.bind_addr, self.port)
    }
}
