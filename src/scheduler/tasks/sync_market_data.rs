use crate::collector::pipeline::run_once;
use crate::domain::model::run_clock::RunClock;
use crate::domain::repository::candle_repository::CandleRepository;
use crate::domain::repository::trading_pair_repository::TradingPairRepository;
use crate::global::{get_bitstamp, get_config, get_mysql_pool};

/// 异步任务：同步交易对状态并增量拉取一分钟 K 线
pub async fn sync_market_data() -> Result<(), anyhow::Error> {
    let config = get_config()?;
    let pool = get_mysql_pool()?;
    let exchange = get_bitstamp()?;

    let registry = TradingPairRepository::new(pool.clone());
    let store = CandleRepository::new(pool);

    run_once(
        exchange.as_ref(),
        &registry,
        &store,
        config.history_floor_unix,
        RunClock::now(),
    )
    .await?;
    Ok(())
}
