use crate::common::log_utils::fmt_list;
use crate::domain::model::candle::CandleError;
use crate::domain::model::run_clock::RunClock;
use crate::domain::model::trading_pair::StartTimestamp;
use crate::domain::model::SyncError;
use crate::domain::repository::PairRegistry;
use crate::infra::external::bitstamp::market::{OhlcCandle, OhlcQuery};
use crate::infra::external::{ExecutionError, MarketApi};
use crate::trace_kv;
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};

pub const FOUR_WEEKS_SECS: i64 = 28 * 24 * 60 * 60;
pub const ONE_DAY_SECS: i64 = 24 * 60 * 60;
const LOOKUP_STEP_SECS: i64 = 60;
/// One day steps taken before the scan jumps straight to the ceiling.
const MAX_DAY_STEPS: u32 = 7;

/// Locates a pair's first one-minute candle between the history floor and the run ceiling.
pub struct StartTimeFinder<'a> {
    api: &'a dyn MarketApi,
    floor_unix: i64,
    clock: RunClock,
}

impl<'a> StartTimeFinder<'a> {
    pub fn new(api: &'a dyn MarketApi, floor_unix: i64, clock: RunClock) -> Self {
        Self {
            api,
            floor_unix,
            clock,
        }
    }

    /// Unix time of the earliest candle, `None` when nothing exists up to the ceiling.
    ///
    /// Read only: the caller persists the result.
    ///
    /// Costs a handful of coarse lookups plus a bisection, logarithmic in the
    /// distance between the floor and the first candle.
    pub async fn find(&self, pair_url: &str) -> Result<Option<i64>, ExecutionError> {
        let ceiling = self.clock.sync_ceiling();
        if self.floor_unix > ceiling {
            return Ok(None);
        }

        // coarse forward scan, step halves down to one day, then jumps to the ceiling
        let mut step = FOUR_WEEKS_SECS;
        let mut day_steps = 0;
        let mut at = self.floor_unix;
        let mut last_empty: Option<i64> = None;
        let first_hit = loop {
            if self.candle_at(pair_url, at).await?.is_some() {
                break at;
            }
            if at >= ceiling {
                debug!("{}: no candle between floor and ceiling", pair_url);
                return Ok(None);
            }
            last_empty = Some(at);
            if step == ONE_DAY_SECS {
                day_steps += 1;
            }
            at = if day_steps > MAX_DAY_STEPS {
                ceiling
            } else {
                (at + step).min(ceiling)
            };
            step = (step / 2).max(ONE_DAY_SECS);
        };

        // bisection between the last empty lookup and the first hit
        let mut low = last_empty.map_or(first_hit, |t| t + LOOKUP_STEP_SECS);
        let mut high = first_hit;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.candle_at(pair_url, mid).await?.is_some() {
                high = mid;
            } else {
                low = mid + LOOKUP_STEP_SECS;
            }
        }

        Ok(self.candle_at(pair_url, low).await?.map(|candle| candle.timestamp))
    }

    async fn candle_at(&self, pair_url: &str, at: i64) -> Result<Option<OhlcCandle>, ExecutionError> {
        let candles = self.api.ohlc(pair_url, OhlcQuery::lookup(at)).await?;
        Ok(candles.into_iter().next())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StartSearchSummary {
    /// `(pair_url, start unix)`
    pub resolved: Vec<(String, i64)>,
    pub unresolved: Vec<String>,
    pub delisted: Vec<String>,
    pub failed: Vec<String>,
}

impl StartSearchSummary {
    /// Every pair the finder ran for, whatever the result.
    pub fn searched(&self) -> HashSet<String> {
        self.resolved
            .iter()
            .map(|(url, _)| url.clone())
            .chain(self.unresolved.iter().cloned())
            .chain(self.delisted.iter().cloned())
            .chain(self.failed.iter().cloned())
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.resolved.is_empty() || !self.delisted.is_empty()
    }

    pub fn log(&self) {
        let resolved: Vec<&str> = self.resolved.iter().map(|(url, _)| url.as_str()).collect();
        trace_kv!(info,
            "stage" => "start_timestamps",
            "resolved" => fmt_list(&resolved),
            "unresolved" => fmt_list(&self.unresolved),
            "delisted" => fmt_list(&self.delisted),
            "failed" => fmt_list(&self.failed),
        );
    }
}

/// 为缺少起始时间的已启用交易对查找并写入首根 K 线时间
#[instrument(name = "resolve_missing_start_timestamps", skip_all)]
pub async fn resolve_missing_start_timestamps(
    api: &dyn MarketApi,
    registry: &dyn PairRegistry,
    floor_unix: i64,
    clock: RunClock,
) -> Result<StartSearchSummary, SyncError> {
    let finder = StartTimeFinder::new(api, floor_unix, clock);
    let checked_at = clock.checked_at();
    let mut summary = StartSearchSummary::default();

    for pair in registry.get_enabled_without_start()? {
        let url = pair.pair_url;
        match finder.find(&url).await {
            Ok(Some(unix)) => match persist_start(registry, &url, unix, clock) {
                Ok(()) => {
                    info!("{}: first candle at {}", url, unix);
                    summary.resolved.push((url, unix));
                }
                Err(err) => {
                    error!("{}: failed to store start timestamp: {}", url, err);
                    summary.failed.push(url);
                }
            },
            Ok(None) => {
                info!("{}: start timestamp not found, retrying next run", url);
                summary.unresolved.push(url);
            }
            Err(err) if err.is_not_found() => {
                warn!("{}: OHLC endpoint reports pair as gone, disabling", url);
                match registry.set_trading_enabled(&url, false, checked_at) {
                    Ok(_) => summary.delisted.push(url),
                    Err(err) => {
                        error!("{}: failed to disable pair: {}", url, err);
                        summary.failed.push(url);
                    }
                }
            }
            Err(err) => {
                warn!("{}: start timestamp search aborted: {}", url, err);
                summary.failed.push(url);
            }
        }
    }

    Ok(summary)
}

/// Writes a resolved start together with the check time.
pub(crate) fn persist_start(
    registry: &dyn PairRegistry,
    pair_url: &str,
    unix: i64,
    clock: RunClock,
) -> Result<(), SyncError> {
    let start = StartTimestamp::from_unix(unix).ok_or(CandleError::InvalidTimestamp(unix))?;
    registry.update_start_timestamp(pair_url, &start, clock.checked_at())?;
    Ok(())
}
