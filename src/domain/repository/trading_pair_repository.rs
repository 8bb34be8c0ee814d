use crate::domain::model::trading_pair::{NewTradingPair, StartTimestamp, TradingPair};
use crate::domain::model::{AppError, AppResult};
use crate::domain::repository::PairRegistry;
use crate::impl_pooled_repository;
use crate::schema::trading_pairs;
use chrono::NaiveDateTime;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};

// trading_pair_repository
impl_pooled_repository!(TradingPairRepository);

impl PairRegistry for TradingPairRepository {
    fn get_all(&self) -> AppResult<Vec<TradingPair>> {
        let mut conn = self.conn()?;
        trading_pairs::table
            .select(TradingPair::as_select())
            .order(trading_pairs::id.asc())
            .load(&mut conn)
            .map_err(AppError::from)
    }

    fn get_enabled(&self) -> AppResult<Vec<TradingPair>> {
        let mut conn = self.conn()?;
        trading_pairs::table
            .filter(trading_pairs::trading_enabled.eq(true))
            .select(TradingPair::as_select())
            .order(trading_pairs::id.asc())
            .load(&mut conn)
            .map_err(AppError::from)
    }

    fn get_enabled_without_start(&self) -> AppResult<Vec<TradingPair>> {
        let mut conn = self.conn()?;
        trading_pairs::table
            .filter(trading_pairs::trading_enabled.eq(true))
            .filter(trading_pairs::start_timestamp.is_null())
            .select(TradingPair::as_select())
            .order(trading_pairs::id.asc())
            .load(&mut conn)
            .map_err(AppError::from)
    }

    fn insert(&self, pair: &NewTradingPair) -> AppResult<usize> {
        if pair.pair_url.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "pair '{}' has no url symbol",
                pair.name
            )));
        }
        let mut conn = self.conn()?;
        diesel::insert_into(trading_pairs::table)
            .values(pair)
            .execute(&mut conn)
            .map_err(AppError::from)
    }

    fn set_trading_enabled(
        &self,
        pair_url: &str,
        enabled: bool,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize> {
        let mut conn = self.conn()?;
        diesel::update(trading_pairs::table.filter(trading_pairs::pair_url.eq(pair_url)))
            .set((
                trading_pairs::trading_enabled.eq(enabled),
                trading_pairs::last_checked_for_trading.eq(Some(checked_at)),
            ))
            .execute(&mut conn)
            .map_err(AppError::from)
    }

    fn update_check_time(&self, pair_url: &str, checked_at: NaiveDateTime) -> AppResult<usize> {
        let mut conn = self.conn()?;
        diesel::update(trading_pairs::table.filter(trading_pairs::pair_url.eq(pair_url)))
            .set(trading_pairs::last_checked_for_trading.eq(Some(checked_at)))
            .execute(&mut conn)
            .map_err(AppError::from)
    }

    fn update_start_timestamp(
        &self,
        pair_url: &str,
        start: &StartTimestamp,
        checked_at: NaiveDateTime,
    ) -> AppResult<usize> {
        let mut conn = self.conn()?;
        diesel::update(
            trading_pairs::table
                .filter(trading_pairs::pair_url.eq(pair_url))
                .filter(trading_pairs::start_timestamp.is_null()),
        )
        .set((
            trading_pairs::start_timestamp.eq(Some(start.at)),
            trading_pairs::start_unix_timestamp.eq(Some(start.unix)),
            trading_pairs::last_checked_for_trading.eq(Some(checked_at)),
        ))
        .execute(&mut conn)
        .map_err(AppError::from)
    }
}
