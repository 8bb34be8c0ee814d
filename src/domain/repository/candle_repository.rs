use crate::domain::model::candle::Candle;
use crate::domain::model::{AppError, AppResult};
use crate::domain::repository::CandleStore;
use crate::impl_pooled_repository;
use crate::schema::ohlc_candles;
use chrono::NaiveDateTime;
use diesel::dsl::max;
use diesel::{Connection, ExpressionMethods, QueryDsl, RunQueryDsl};

// candle_repository
impl_pooled_repository!(CandleRepository);

impl CandleStore for CandleRepository {
    fn latest_timestamp(&self, pair_id: i32) -> AppResult<Option<NaiveDateTime>> {
        let mut conn = self.conn()?;
        ohlc_candles::table
            .filter(ohlc_candles::pair_id.eq(pair_id))
            .select(max(ohlc_candles::timestamp))
            .get_result::<Option<NaiveDateTime>>(&mut conn)
            .map_err(AppError::from)
    }

    fn append(&self, candles: &[Candle]) -> AppResult<usize> {
        if candles.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        // INSERT IGNORE: (pair_id, timestamp) is the primary key
        conn.transaction(|conn| {
            diesel::insert_or_ignore_into(ohlc_candles::table)
                .values(candles)
                .execute(conn)
        })
        .map_err(AppError::from)
    }
}
