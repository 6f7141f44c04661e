pub mod api;
pub mod config;
pub mod db;

pub use db::DbPool;

use config::Config;
use std::time::{Duration, Instant};

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    /// Shared client for the upstream proxy endpoints
    pub http: reqwest::Client,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(format!("soko/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            config,
            db,
            http,
            start_time: Instant::now(),
        }
    }
}
