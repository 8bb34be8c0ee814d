use crate::domain::model::candle::Candle;
use crate::domain::model::trading_pair::{NewTradingPair, StartTimestamp, TradingPair};
use crate::domain::model::AppResult;
use chrono::NaiveDateTime;

pub mod candle_repository;
pub mod trading_pair_repository;

/// 交易对注册表
///
/// Every write is committed on its own; update methods return the number of rows touched.
pub trait PairRegistry: Send + Sync {
    fn get_all(&self) -> AppResult<Vec<TradingPair>>;

    fn get_enabled(&self) -> AppResult<Vec<TradingPair>>;

    /// Enabled pairs whose first-trade time is still unknown.
    fn get_enabled_without_start(&self) -> AppResult<Vec<TradingPair>>;

    fn insert(&self, pair: &NewTradingPair) -> AppResult<usize>;

    fn set_trading_enabled(
        &self,
        pair_url: &str,
        enabled: bool,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize>;

    fn update_check_time(&self, pair_url: &str, checked_at: NaiveDateTime) -> AppResult<usize>;

    /// Only applies while the start is still unset.
    fn update_start_timestamp(
        &self,
        pair_url: &str,
        start: &StartTimestamp,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize>;
}

/// 按交易对分区的 K 线存储，只追加
pub trait CandleStore: Send + Sync {
    fn latest_timestamp(&self, pair_id: i32) -> AppResult<Option<NaiveDateTime>>;

    /// Rows already present for `(pair_id, timestamp)` are skipped; returns rows written.
    fn append(&self, candles: &[Candle]) -> AppResult<usize>;
}
