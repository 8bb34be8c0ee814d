pub mod helper;
pub mod progress;

use crate::collector::start_time::{persist_start, StartTimeFinder};
use crate::collector::sync::helper::{first_gap, is_candle_continuous, page_to_candles};
use crate::collector::sync::progress::{ProgressTracker, SyncCursor};
use crate::common::log_utils::{fmt_list, fmt_naive_datetime, fmt_opt};
use crate::domain::model::run_clock::RunClock;
use crate::domain::model::trading_pair::TradingPair;
use crate::domain::model::SyncError;
use crate::domain::repository::{CandleStore, PairRegistry};
use crate::infra::external::bitstamp::market::OhlcQuery;
use crate::infra::external::MarketApi;
use crate::trace_kv;
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSyncOutcome {
    Synced { rows: usize },
    UpToDate,
    /// No stored candles and the first trade could not be located.
    StartUnknown,
    /// The OHLC endpoint answered 404; rows appended before that are counted.
    Delisted { rows: usize },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandleSyncSummary {
    /// `(pair_url, rows appended)`
    pub synced: Vec<(String, usize)>,
    pub up_to_date: usize,
    pub start_unknown: Vec<String>,
    pub delisted: Vec<String>,
    pub failed: Vec<String>,
}

impl CandleSyncSummary {
    fn record(&mut self, pair_url: String, outcome: PairSyncOutcome) {
        match outcome {
            PairSyncOutcome::Synced { rows } => self.synced.push((pair_url, rows)),
            PairSyncOutcome::UpToDate => self.up_to_date += 1,
            PairSyncOutcome::StartUnknown => self.start_unknown.push(pair_url),
            PairSyncOutcome::Delisted { rows } => {
                if rows > 0 {
                    self.synced.push((pair_url.clone(), rows));
                }
                self.delisted.push(pair_url);
            }
        }
    }

    pub fn total_rows(&self) -> usize {
        self.synced.iter().map(|(_, rows)| rows).sum()
    }

    pub fn has_changes(&self) -> bool {
        self.total_rows() > 0 || !self.delisted.is_empty()
    }

    pub fn log(&self) {
        let synced: Vec<String> = self
            .synced
            .iter()
            .map(|(url, rows)| format!("{}={}", url, rows))
            .collect();
        trace_kv!(info,
            "stage" => "candles",
            "rows" => self.total_rows(),
            "synced" => fmt_list(&synced),
            "up_to_date" => self.up_to_date,
            "start_unknown" => fmt_list(&self.start_unknown),
            "delisted" => fmt_list(&self.delisted),
            "failed" => fmt_list(&self.failed),
        );
    }
}

/// 逐个交易对增量同步一分钟 K 线
pub struct CandleSyncer<'a> {
    api: &'a dyn MarketApi,
    registry: &'a dyn PairRegistry,
    store: &'a dyn CandleStore,
    floor_unix: i64,
    clock: RunClock,
}

impl<'a> CandleSyncer<'a> {
    pub fn new(
        api: &'a dyn MarketApi,
        registry: &'a dyn PairRegistry,
        store: &'a dyn CandleStore,
        floor_unix: i64,
        clock: RunClock,
    ) -> Self {
        Self {
            api,
            registry,
            store,
            floor_unix,
            clock,
        }
    }

    /// Syncs every enabled pair in turn. Pairs in `searched` already had a start search this run.
    #[instrument(name = "sync_candles", skip_all)]
    pub async fn sync_all(&self, searched: &HashSet<String>) -> Result<CandleSyncSummary, SyncError> {
        let mut summary = CandleSyncSummary::default();

        for pair in self.registry.get_enabled()? {
            match self.sync_pair(&pair, searched).await {
                Ok(outcome) => summary.record(pair.pair_url, outcome),
                Err(err) => {
                    error!("{}: candle sync aborted: {}", pair.pair_url, err);
                    summary.failed.push(pair.pair_url);
                }
            }
        }

        Ok(summary)
    }

    pub async fn sync_pair(
        &self,
        pair: &TradingPair,
        searched: &HashSet<String>,
    ) -> Result<PairSyncOutcome, SyncError> {
        let url = pair.pair_url.as_str();
        let checked_at = self.clock.checked_at();

        let cursor = match ProgressTracker::derive_cursor(self.store, pair)? {
            Some(cursor) => cursor,
            None if searched.contains(url) => return Ok(PairSyncOutcome::StartUnknown),
            None => {
                let finder = StartTimeFinder::new(self.api, self.floor_unix, self.clock);
                match finder.find(url).await {
                    Ok(Some(unix)) => {
                        persist_start(self.registry, url, unix, self.clock)?;
                        info!("{}: first candle at {}", url, unix);
                        SyncCursor::from_start(unix)
                    }
                    Ok(None) => return Ok(PairSyncOutcome::StartUnknown),
                    Err(err) if err.is_not_found() => {
                        warn!("{}: OHLC endpoint reports pair as gone, disabling", url);
                        self.registry.set_trading_enabled(url, false, checked_at)?;
                        return Ok(PairSyncOutcome::Delisted { rows: 0 });
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let ceiling = self.clock.sync_ceiling();
        let mut start = cursor.next_start;
        let mut rows = 0;
        trace_kv!(debug,
            "pair" => url,
            "from" => start,
            "cursor" => format!("{:?}", cursor.source),
            "ceiling" => ceiling,
            "start" => fmt_opt(&pair.start_unix_timestamp),
            "last_checked" => fmt_naive_datetime(&pair.last_checked_for_trading),
        );

        while start < ceiling {
            let query = OhlcQuery::page(start);
            let page = match self.api.ohlc(url, query).await {
                Ok(page) => page,
                Err(err) if err.is_not_found() => {
                    warn!("{}: OHLC endpoint reports pair as gone, disabling", url);
                    self.registry.set_trading_enabled(url, false, checked_at)?;
                    return Ok(PairSyncOutcome::Delisted { rows });
                }
                Err(err) => return Err(err.into()),
            };

            let window_end = start + query.span_secs();
            let candles = page_to_candles(pair.id, &page, start, window_end, ceiling)?;
            if !is_candle_continuous(&candles) {
                if let Some((before, after)) = first_gap(&candles) {
                    warn!("{}: gap in candles between {} and {}", url, before, after);
                }
            }
            rows += self.store.append(&candles)?;
            start = window_end;
        }

        self.registry.update_check_time(url, checked_at)?;
        if rows > 0 {
            Ok(PairSyncOutcome::Synced { rows })
        } else {
            Ok(PairSyncOutcome::UpToDate)
        }
    }
}
