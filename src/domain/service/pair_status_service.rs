use crate::common::log_utils::fmt_list;
use crate::domain::model::run_clock::RunClock;
use crate::domain::model::trading_pair::{NewTradingPair, TradingPair};
use crate::domain::model::{AppResult, SyncError};
use crate::domain::repository::PairRegistry;
use crate::infra::external::bitstamp::meta::PairInfo;
use crate::infra::external::MarketApi;
use crate::trace_kv;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use tracing::{error, info, instrument};

/// Registry writes needed to match the remote pair list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub inserts: Vec<NewTradingPair>,
    pub re_enable: Vec<String>,
    pub disable: Vec<String>,
    /// Known pairs whose status already matches; only the check time moves.
    pub touch: Vec<String>,
}

/// Compares the remote pair list with the registry.
///
/// | registry \ remote | tradeable  | not tradeable | absent  |
/// |-------------------|------------|---------------|---------|
/// | unknown           | insert     | insert (off)  | -       |
/// | enabled           | touch      | disable       | disable |
/// | disabled          | re-enable  | touch         | -       |
///
/// Remote entries repeating a url symbol are ignored after the first.
pub fn plan_reconciliation(
    remote: &[PairInfo],
    known: &[TradingPair],
    checked_at: NaiveDateTime,
) -> ReconcilePlan {
    let known_by_url: HashMap<&str, &TradingPair> =
        known.iter().map(|p| (p.pair_url.as_str(), p)).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = ReconcilePlan::default();

    for info in remote {
        let url = info.url_symbol.as_str();
        if !seen.insert(url) {
            continue;
        }
        match (known_by_url.get(url), info.trading.is_tradeable()) {
            (None, _) => plan.inserts.push(NewTradingPair::from((info, checked_at))),
            (Some(pair), true) if !pair.trading_enabled => plan.re_enable.push(url.to_string()),
            (Some(pair), false) if pair.trading_enabled => plan.disable.push(url.to_string()),
            (Some(_), _) => plan.touch.push(url.to_string()),
        }
    }

    plan.disable.extend(
        known
            .iter()
            .filter(|p| p.trading_enabled && !seen.contains(p.pair_url.as_str()))
            .map(|p| p.pair_url.clone()),
    );

    plan
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcileSummary {
    pub added: Vec<String>,
    /// New pairs the exchange lists as not trading.
    pub added_disabled: Vec<String>,
    pub re_enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub checked: usize,
    pub failed: Vec<String>,
}

impl ReconcileSummary {
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty()
            && self.added_disabled.is_empty()
            && self.re_enabled.is_empty()
            && self.disabled.is_empty())
    }

    pub fn log(&self) {
        trace_kv!(info,
            "stage" => "pair_status",
            "added" => fmt_list(&self.added),
            "added_disabled" => fmt_list(&self.added_disabled),
            "re_enabled" => fmt_list(&self.re_enabled),
            "disabled" => fmt_list(&self.disabled),
            "checked" => self.checked,
            "failed" => fmt_list(&self.failed),
        );
    }
}

/// 交易对状态同步服务
pub struct PairStatusService<'a> {
    api: &'a dyn MarketApi,
    registry: &'a dyn PairRegistry,
    clock: RunClock,
}

impl<'a> PairStatusService<'a> {
    pub fn new(api: &'a dyn MarketApi, registry: &'a dyn PairRegistry, clock: RunClock) -> Self {
        Self {
            api,
            registry,
            clock,
        }
    }

    /// 拉取远端交易对列表并同步注册表状态
    ///
    /// A failed pair list fetch returns before any registry write.
    #[instrument(name = "reconcile_pair_status", skip_all)]
    pub async fn reconcile(&self) -> Result<ReconcileSummary, SyncError> {
        let remote = self.api.trading_pairs().await?;
        let known = self.registry.get_all()?;
        let checked_at = self.clock.checked_at();
        let plan = plan_reconciliation(&remote, &known, checked_at);
        let mut summary = ReconcileSummary::default();

        for pair in &plan.inserts {
            if record_write(self.registry.insert(pair), &pair.pair_url, &mut summary) {
                info!("New pair {} ({}), trading={}", pair.pair_url, pair.name, pair.trading_enabled);
                if pair.trading_enabled {
                    summary.added.push(pair.pair_url.clone());
                } else {
                    summary.added_disabled.push(pair.pair_url.clone());
                }
            }
        }

        for url in &plan.re_enable {
            let result = self.registry.set_trading_enabled(url, true, checked_at);
            if record_write(result, url, &mut summary) {
                info!("Pair {} is trading again", url);
                summary.re_enabled.push(url.clone());
            }
        }

        for url in &plan.disable {
            let result = self.registry.set_trading_enabled(url, false, checked_at);
            if record_write(result, url, &mut summary) {
                info!("Pair {} disabled", url);
                summary.disabled.push(url.clone());
            }
        }

        for url in &plan.touch {
            let result = self.registry.update_check_time(url, checked_at);
            if record_write(result, url, &mut summary) {
                summary.checked += 1;
            }
        }

        Ok(summary)
    }
}

/// `false` for a failed write, logged and listed in `failed`.
fn record_write(
    result: AppResult<usize>,
    pair_url: &str,
    summary: &mut ReconcileSummary,
) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            error!("Failed to update pair {}: {}", pair_url, err);
            summary.failed.push(pair_url.to_string());
            false
        }
    }
}
