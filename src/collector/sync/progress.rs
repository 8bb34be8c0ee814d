use crate::domain::model::candle::CANDLE_INTERVAL_SECS;
use crate::domain::model::run_clock::naive_to_unix;
use crate::domain::model::trading_pair::TradingPair;
use crate::domain::model::AppResult;
use crate::domain::repository::CandleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorSource {
    /// One interval after the newest stored candle.
    StoredCandles,
    /// Empty store, resumes at the pair's first trade.
    StartTimestamp,
}

/// Where the next page for a pair begins. Recomputed every run, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCursor {
    pub next_start: i64,
    pub source: CursorSource,
}

impl SyncCursor {
    pub fn from_start(start_unix: i64) -> Self {
        Self {
            next_start: start_unix,
            source: CursorSource::StartTimestamp,
        }
    }
}

pub struct ProgressTracker;

impl ProgressTracker {
    /// `None` when neither stored candles nor a start timestamp exist yet.
    pub fn derive_cursor(
        store: &dyn CandleStore,
        pair: &TradingPair,
    ) -> AppResult<Option<SyncCursor>> {
        if let Some(latest) = store.latest_timestamp(pair.id)? {
            return Ok(Some(SyncCursor {
                next_start: naive_to_unix(&latest) + CANDLE_INTERVAL_SECS,
                source: CursorSource::StoredCandles,
            }));
        }
        Ok(pair.start_unix_timestamp.map(SyncCursor::from_start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::candle::Candle;
    use crate::domain::model::run_clock::unix_to_naive;
    use crate::domain::repository::PairRegistry;
    use crate::testing::{MemoryCandleStore, MemoryRegistry};
    use bigdecimal::BigDecimal;

    fn candle(pair_id: i32, unix: i64) -> Candle {
        Candle {
            pair_id,
            timestamp: unix_to_naive(unix).unwrap(),
            open: BigDecimal::from(1),
            high: BigDecimal::from(1),
            low: BigDecimal::from(1),
            close: BigDecimal::from(1),
            volume: BigDecimal::from(0),
        }
    }

    fn pair(registry: &MemoryRegistry, url: &str, start: Option<i64>) -> TradingPair {
        registry.seed(url, true, start);
        registry
            .get_all()
            .unwrap()
            .into_iter()
            .find(|p| p.pair_url == url)
            .unwrap()
    }

    #[test]
    fn cursor_follows_latest_stored_candle() {
        let registry = MemoryRegistry::new();
        let store = MemoryCandleStore::new();
        let btc = pair(&registry, "btcusd", Some(1_735_000_020));
        store
            .append(&[candle(btc.id, 1_735_000_020), candle(btc.id, 1_735_000_080)])
            .unwrap();

        let cursor = ProgressTracker::derive_cursor(&store, &btc).unwrap().unwrap();
        assert_eq!(cursor.next_start, 1_735_000_140);
        assert_eq!(cursor.source, CursorSource::StoredCandles);
    }

    #[test]
    fn empty_store_falls_back_to_start_then_none() {
        let registry = MemoryRegistry::new();
        let store = MemoryCandleStore::new();
        let btc = pair(&registry, "btcusd", Some(1_735_000_020));
        let eth = pair(&registry, "ethusd", None);

        assert_eq!(
            ProgressTracker::derive_cursor(&store, &btc).unwrap(),
            Some(SyncCursor::from_start(1_735_000_020))
        );
        assert_eq!(ProgressTracker::derive_cursor(&store, &eth).unwrap(), None);
    }

    #[test]
    fn derivation_is_idempotent() {
        let registry = MemoryRegistry::new();
        let store = MemoryCandleStore::new();
        let btc = pair(&registry, "btcusd", Some(1_735_000_020));
        store.append(&[candle(btc.id, 1_735_000_020)]).unwrap();

        let first = ProgressTracker::derive_cursor(&store, &btc).unwrap();
        let second = ProgressTracker::derive_cursor(&store, &btc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn other_pairs_do_not_move_the_cursor() {
        let registry = MemoryRegistry::new();
        let store = MemoryCandleStore::new();
        let btc = pair(&registry, "btcusd", Some(1_735_000_020));
        let eth = pair(&registry, "ethusd", Some(1_735_000_020));
        store.append(&[candle(eth.id, 1_739_000_040)]).unwrap();

        let cursor = ProgressTracker::derive_cursor(&store, &btc).unwrap().unwrap();
        assert_eq!(cursor.next_start, 1_735_000_020);
    }
}
