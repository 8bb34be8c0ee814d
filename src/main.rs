use bitstamp_ohlc_sync::common::config::SyncConfig;
use bitstamp_ohlc_sync::common::log_utils::setup_tracing;
use bitstamp_ohlc_sync::global::init_global_services;
use bitstamp_ohlc_sync::scheduler::tasks::sync_market_data::sync_market_data;
use bitstamp_ohlc_sync::scheduler::Scheduler;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();
    info!("Starting bitstamp ohlc sync...");

    let config = SyncConfig::from_env()?;
    let interval = config.sync_interval;
    init_global_services(config)?;

    match interval {
        // single pass for cron style invocation
        None => sync_market_data().await,
        Some(interval) => {
            Scheduler::new(interval).run().await;
            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            Ok(())
        }
    }
}
