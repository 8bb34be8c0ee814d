use crate::domain::model::candle::{Candle, CandleError, CANDLE_INTERVAL_SECS};
use crate::infra::external::bitstamp::market::OhlcCandle;

pub fn is_candle_continuous(candles: &[Candle]) -> bool {
    candles
        .windows(2)
        .all(|w| w[1].unix_timestamp() - w[0].unix_timestamp() == CANDLE_INTERVAL_SECS)
}

/// First `(before, after)` pair of neighbouring timestamps further apart than one interval.
pub fn first_gap(candles: &[Candle]) -> Option<(i64, i64)> {
    candles
        .windows(2)
        .map(|w| (w[0].unix_timestamp(), w[1].unix_timestamp()))
        .find(|(a, b)| b - a != CANDLE_INTERVAL_SECS)
}

/// Keeps candles inside `[window_start, window_end)` that closed before `ceiling`,
/// ordered and without duplicate timestamps, then validates them.
pub fn page_to_candles(
    pair_id: i32,
    page: &[OhlcCandle],
    window_start: i64,
    window_end: i64,
    ceiling: i64,
) -> Result<Vec<Candle>, CandleError> {
    let mut kept: Vec<&OhlcCandle> = page
        .iter()
        .filter(|c| c.timestamp >= window_start && c.timestamp < window_end)
        .filter(|c| c.timestamp <= ceiling)
        .collect();
    kept.sort_by_key(|c| c.timestamp);
    kept.dedup_by_key(|c| c.timestamp);

    kept.into_iter()
        .map(|c| Candle::try_from_ohlc(pair_id, c))
        .collect()
}
