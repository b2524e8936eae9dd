mod api;
mod average;
mod config;
mod error;
mod fetcher;
mod registry;
mod service;
mod state;
mod types;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::FetchLatency;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::UpstreamClient;
use crate::service::NumberService;
use crate::state::WindowStore;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let upstream = UpstreamClient::from_config(&cfg)?;
    info!(
        "Upstream: {} (timeout {:?}, no retries)",
        upstream.base_url(),
        upstream.timeout(),
    );

    // One window for the whole process, shared by every category.
    let window = WindowStore::new(cfg.window_size);
    info!("Window capacity: {}", window.capacity());

    let service = NumberService::new(
        window,
        upstream,
        Arc::new(FetchLatency::new()?),
        Arc::new(HealthState::new()),
    );

    let app = router(ApiState { service });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Average Calculator service listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

pub(crate) fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
