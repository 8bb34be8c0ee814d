//! In-memory registry, candle store and a synthetic Bitstamp for unit tests.

use crate::domain::model::candle::Candle;
use crate::domain::model::run_clock::naive_to_unix;
use crate::domain::model::trading_pair::{NewTradingPair, StartTimestamp, TradingPair};
use crate::domain::model::{AppError, AppResult};
use crate::domain::repository::{CandleStore, PairRegistry};
use crate::infra::external::bitstamp::market::{OhlcCandle, OhlcQuery};
use crate::infra::external::bitstamp::meta::{PairInfo, TradingStatus};
use crate::infra::external::{ExecutionError, MarketApi};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use reqwest::StatusCode;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

/// Minute aligned run time used across the tests.
pub const NOW: i64 = 1_740_000_000;

pub const PRICE: &str = "12345.123456789012";
pub const VOLUME: &str = "0.5";

pub fn pair_info(url: &str, trading: TradingStatus) -> PairInfo {
    PairInfo {
        name: url.to_uppercase(),
        url_symbol: url.to_string(),
        trading,
        description: Some(format!("{} market", url)),
        minimum_order: Some("10 USD".to_string()),
    }
}

#[derive(Default)]
pub struct MemoryRegistry {
    pairs: Mutex<Vec<TradingPair>>,
    writes: Mutex<usize>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row directly, bypassing the write counter.
    pub fn seed(&self, url: &str, enabled: bool, start_unix: Option<i64>) -> i32 {
        let mut pairs = self.pairs.lock().unwrap();
        let id = pairs.len() as i32 + 1;
        let start = start_unix.and_then(StartTimestamp::from_unix);
        pairs.push(TradingPair {
            id,
            pair_url: url.to_string(),
            name: url.to_uppercase(),
            trading_enabled: enabled,
            last_checked_for_trading: None,
            start_timestamp: start.map(|s| s.at),
            start_unix_timestamp: start.map(|s| s.unix),
            description: None,
            minimum_order: None,
        });
        id
    }

    pub fn get(&self, url: &str) -> Option<TradingPair> {
        self.pairs
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.pair_url == url)
            .cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn select(&self, keep: impl Fn(&TradingPair) -> bool) -> AppResult<Vec<TradingPair>> {
        Ok(self
            .pairs
            .lock()
            .unwrap()
            .iter()
            .filter(|p| keep(p))
            .cloned()
            .collect())
    }

    fn update(&self, url: &str, apply: impl Fn(&mut TradingPair) -> bool) -> AppResult<usize> {
        *self.writes.lock().unwrap() += 1;
        let mut pairs = self.pairs.lock().unwrap();
        Ok(pairs
            .iter_mut()
            .filter(|p| p.pair_url == url)
            .map(|p| apply(p))
            .filter(|changed| *changed)
            .count())
    }
}

impl PairRegistry for MemoryRegistry {
    fn get_all(&self) -> AppResult<Vec<TradingPair>> {
        self.select(|_| true)
    }

    fn get_enabled(&self) -> AppResult<Vec<TradingPair>> {
        self.select(|p| p.trading_enabled)
    }

    fn get_enabled_without_start(&self) -> AppResult<Vec<TradingPair>> {
        self.select(|p| p.trading_enabled && p.start_timestamp.is_none())
    }

    fn insert(&self, pair: &NewTradingPair) -> AppResult<usize> {
        *self.writes.lock().unwrap() += 1;
        let mut pairs = self.pairs.lock().unwrap();
        if pairs.iter().any(|p| p.pair_url == pair.pair_url) {
            return Err(AppError::DatabaseError(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new(format!("Duplicate entry '{}'", pair.pair_url)),
            )));
        }
        let id = pairs.len() as i32 + 1;
        pairs.push(TradingPair {
            id,
            pair_url: pair.pair_url.clone(),
            name: pair.name.clone(),
            trading_enabled: pair.trading_enabled,
            last_checked_for_trading: pair.last_checked_for_trading,
            start_timestamp: None,
            start_unix_timestamp: None,
            description: pair.description.clone(),
            minimum_order: pair.minimum_order.clone(),
        });
        Ok(1)
    }

    fn set_trading_enabled(
        &self,
        pair_url: &str,
        enabled: bool,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize> {
        self.update(pair_url, |p| {
            p.trading_enabled = enabled;
            p.last_checked_for_trading = Some(checked_at);
            true
        })
    }

    fn update_check_time(&self, pair_url: &str, checked_at: NaiveDateTime) -> AppResult<usize> {
        self.update(pair_url, |p| {
            p.last_checked_for_trading = Some(checked_at);
            true
        })
    }

    fn update_start_timestamp(
        &self,
        pair_url: &str,
        start: &StartTimestamp,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize> {
        self.update(pair_url, |p| {
            if p.start_timestamp.is_some() {
                return false;
            }
            p.start_timestamp = Some(start.at);
            p.start_unix_timestamp = Some(start.unix);
            p.last_checked_for_trading = Some(checked_at);
            true
        })
    }
}

/// `(pair_id, unix timestamp)` keyed store with INSERT IGNORE semantics.
#[derive(Default)]
pub struct MemoryCandleStore {
    rows: Mutex<BTreeMap<(i32, i64), Candle>>,
}

impl MemoryCandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, pair_id: i32) -> Vec<Candle> {
        self.rows
            .lock()
            .unwrap()
            .range((pair_id, i64::MIN)..=(pair_id, i64::MAX))
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn timestamps(&self, pair_id: i32) -> Vec<i64> {
        self.rows(pair_id).iter().map(Candle::unix_timestamp).collect()
    }
}

impl CandleStore for MemoryCandleStore {
    fn latest_timestamp(&self, pair_id: i32) -> AppResult<Option<NaiveDateTime>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .range((pair_id, i64::MIN)..=(pair_id, i64::MAX))
            .next_back()
            .map(|(_, c)| c.timestamp))
    }

    fn append(&self, candles: &[Candle]) -> AppResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let mut written = 0;
        for candle in candles {
            let key = (candle.pair_id, naive_to_unix(&candle.timestamp));
            if !rows.contains_key(&key) {
                rows.insert(key, candle.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

struct FakeState {
    now: i64,
    first_trade: HashMap<String, i64>,
    not_found: HashSet<String>,
    unreachable: HashSet<String>,
    fail_from_call: HashMap<String, usize>,
    calls: HashMap<String, usize>,
    price: String,
    pairs: Vec<PairInfo>,
    pairs_unavailable: bool,
}

/// Synthetic OHLC endpoint: a pair has one candle per minute from its first trade onwards.
pub struct FakeMarket {
    state: Mutex<FakeState>,
}

impl FakeMarket {
    pub fn new(now: i64) -> Self {
        Self {
            state: Mutex::new(FakeState {
                now,
                first_trade: HashMap::new(),
                not_found: HashSet::new(),
                unreachable: HashSet::new(),
                fail_from_call: HashMap::new(),
                calls: HashMap::new(),
                price: PRICE.to_string(),
                pairs: Vec::new(),
                pairs_unavailable: false,
            }),
        }
    }

    pub fn with_history(self, url: &str, first_trade: i64) -> Self {
        self.state
            .lock()
            .unwrap()
            .first_trade
            .insert(url.to_string(), first_trade);
        self
    }

    pub fn with_pairs(self, pairs: Vec<PairInfo>) -> Self {
        self.state.lock().unwrap().pairs = pairs;
        self
    }

    pub fn set_now(&self, now: i64) {
        self.state.lock().unwrap().now = now;
    }

    pub fn set_price(&self, price: &str) {
        self.state.lock().unwrap().price = price.to_string();
    }

    /// Every OHLC request for `url` answers 404.
    pub fn delist(&self, url: &str) {
        self.state.lock().unwrap().not_found.insert(url.to_string());
    }

    /// Every OHLC request for `url` fails to connect.
    pub fn unreachable(&self, url: &str) {
        self.state.lock().unwrap().unreachable.insert(url.to_string());
    }

    /// The `nth` OHLC request for `url` (1 based) and all later ones answer 500.
    pub fn fail_from_call(&self, url: &str, nth: usize) {
        self.state
            .lock()
            .unwrap()
            .fail_from_call
            .insert(url.to_string(), nth);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().fail_from_call.clear();
    }

    pub fn set_pairs_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().pairs_unavailable = unavailable;
    }

    pub fn calls(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

#[async_trait]
impl MarketApi for FakeMarket {
    async fn trading_pairs(&self) -> Result<Vec<PairInfo>, ExecutionError> {
        let state = self.state.lock().unwrap();
        if state.pairs_unavailable {
            return Err(ExecutionError::HttpResponse(
                StatusCode::SERVICE_UNAVAILABLE,
                "maintenance".to_string(),
            ));
        }
        Ok(state.pairs.clone())
    }

    async fn ohlc(
        &self,
        pair_url: &str,
        query: OhlcQuery,
    ) -> Result<Vec<OhlcCandle>, ExecutionError> {
        let (call, unreachable) = {
            let mut state = self.state.lock().unwrap();
            let calls = state.calls.entry(pair_url.to_string()).or_insert(0);
            *calls += 1;
            let call = *calls;
            (call, state.unreachable.contains(pair_url))
        };
        if unreachable {
            return Err(connection_refused().await);
        }

        let state = self.state.lock().unwrap();

        if state.not_found.contains(pair_url) {
            return Err(ExecutionError::NotFound {
                path: format!("/ohlc/{}/", pair_url),
            });
        }
        if matches!(state.fail_from_call.get(pair_url), Some(nth) if call >= *nth) {
            return Err(ExecutionError::HttpResponse(
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream error".to_string(),
            ));
        }
        let Some(&first_trade) = state.first_trade.get(pair_url) else {
            return Ok(vec![]);
        };

        let current_minute = state.now - state.now.rem_euclid(60);
        let upper = if query.exclude_current_candle {
            current_minute
        } else {
            current_minute + 60
        };
        let end = (query.start + query.span_secs()).min(upper);
        let aligned_start = query.start + (60 - query.start.rem_euclid(60)) % 60;

        let price = BigDecimal::from_str(&state.price).unwrap();
        let volume = BigDecimal::from_str(VOLUME).unwrap();
        let mut ts = aligned_start.max(first_trade);
        let mut candles = Vec::new();
        while ts < end {
            candles.push(OhlcCandle {
                timestamp: ts,
                open: price.clone(),
                high: price.clone(),
                low: price.clone(),
                close: price.clone(),
                volume: volume.clone(),
            });
            ts += 60;
        }
        Ok(candles)
    }
}

/// A real transport error: nothing listens on port 1.
pub async fn connection_refused() -> ExecutionError {
    let client = reqwest::Client::builder()
        .no_proxy()
        .connect_timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    match client.get("http://127.0.0.1:1/").send().await {
        Err(err) => ExecutionError::Transport(err),
        Ok(response) => panic!("unexpected answer {}", response.status()),
    }
}
