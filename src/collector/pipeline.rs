use crate::collector::start_time::{resolve_missing_start_timestamps, StartSearchSummary};
use crate::collector::sync::{CandleSyncSummary, CandleSyncer};
use crate::domain::model::run_clock::RunClock;
use crate::domain::model::SyncError;
use crate::domain::repository::{CandleStore, PairRegistry};
use crate::domain::service::pair_status_service::{PairStatusService, ReconcileSummary};
use crate::infra::external::MarketApi;
use crate::trace_kv;
use tracing::{error, info, instrument};

/// Per-stage results of one run; `None` for a stage that failed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub reconcile: Option<ReconcileSummary>,
    pub start_search: Option<StartSearchSummary>,
    pub candles: Option<CandleSyncSummary>,
}

impl RunReport {
    pub fn has_changes(&self) -> bool {
        self.reconcile.as_ref().is_some_and(ReconcileSummary::has_changes)
            || self
                .start_search
                .as_ref()
                .is_some_and(StartSearchSummary::has_changes)
            || self.candles.as_ref().is_some_and(CandleSyncSummary::has_changes)
    }

    pub fn log(&self) {
        if !self.has_changes() {
            trace_kv!(debug,
                "run" => "no changes",
                "reconciled" => self.reconcile.is_some(),
                "candles" => self.candles.is_some(),
            );
            return;
        }
        if let Some(summary) = &self.reconcile {
            summary.log();
        }
        if let Some(summary) = &self.start_search {
            summary.log();
        }
        if let Some(summary) = &self.candles {
            summary.log();
        }
    }
}

/// One full pass: pair status, missing start timestamps, then candles.
///
/// A stage error that only concerns that stage is logged and the next stage still runs.
#[instrument(name = "sync_run", skip_all, fields(now = clock.unix()))]
pub async fn run_once(
    api: &dyn MarketApi,
    registry: &dyn PairRegistry,
    store: &dyn CandleStore,
    floor_unix: i64,
    clock: RunClock,
) -> Result<RunReport, SyncError> {
    info!("Sync run started");
    let mut report = RunReport::default();

    report.reconcile = stage(
        "pair_status",
        PairStatusService::new(api, registry, clock).reconcile().await,
    )?;

    report.start_search = stage(
        "start_timestamps",
        resolve_missing_start_timestamps(api, registry, floor_unix, clock).await,
    )?;

    let searched = report
        .start_search
        .as_ref()
        .map(StartSearchSummary::searched)
        .unwrap_or_default();
    report.candles = stage(
        "candles",
        CandleSyncer::new(api, registry, store, floor_unix, clock)
            .sync_all(&searched)
            .await,
    )?;

    report.log();
    info!("Sync run finished");
    Ok(report)
}

fn stage<T>(name: &str, result: Result<T, SyncError>) -> Result<Option<T>, SyncError> {
    match result {
        Ok(summary) => Ok(Some(summary)),
        Err(err) if err.aborts_run() => {
            error!("Stage {} failed, aborting run: {}", name, err);
            Err(err)
        }
        Err(err) => {
            error!("Stage {} failed: {}", name, err);
            Ok(None)
        }
    }
}
