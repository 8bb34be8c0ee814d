use crate::domain::model::run_clock::{naive_to_unix, unix_to_naive};
use crate::infra::external::bitstamp::market::OhlcCandle;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::Insertable;
use thiserror::Error;

/// One-minute candles only.
pub const CANDLE_INTERVAL_SECS: i64 = 60;

/// `DECIMAL(20, 12)` open/high/low/close columns.
pub const PRICE_BOUNDS: NumericBounds = NumericBounds {
    precision: 20,
    scale: 12,
};

/// `DECIMAL(28, 12)` volume column.
pub const VOLUME_BOUNDS: NumericBounds = NumericBounds {
    precision: 28,
    scale: 12,
};

/// 一分钟 K 线，按 (pair_id, timestamp) 唯一
#[derive(Debug, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ohlc_candles)]
pub struct Candle {
    pub pair_id: i32,

    /// 开盘时间 (UTC)
    pub timestamp: NaiveDateTime,

    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub volume: BigDecimal,
}

#[derive(Debug, Error, PartialEq)]
pub enum CandleError {
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("{field} = {value} does not fit DECIMAL({precision}, {scale})")]
    OutOfBounds {
        field: &'static str,
        value: String,
        precision: u32,
        scale: u32,
    },
}

/// Precision/scale limits of a SQL `DECIMAL` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericBounds {
    pub precision: u32,
    pub scale: u32,
}

impl NumericBounds {
    /// True when `value` is stored without rounding or overflow.
    pub fn admits(&self, value: &BigDecimal) -> bool {
        let normalized = value.normalized();
        let (_, exponent) = normalized.as_bigint_and_exponent();
        let digits = normalized.digits() as i64;

        let fraction_digits = exponent.max(0);
        let integer_digits = (digits - exponent).max(0);

        fraction_digits <= self.scale as i64
            && integer_digits <= (self.precision - self.scale) as i64
    }

    fn check(&self, field: &'static str, value: &BigDecimal) -> Result<(), CandleError> {
        if self.admits(value) {
            Ok(())
        } else {
            Err(CandleError::OutOfBounds {
                field,
                value: value.to_string(),
                precision: self.precision,
                scale: self.scale,
            })
        }
    }
}

impl Candle {
    pub fn unix_timestamp(&self) -> i64 {
        naive_to_unix(&self.timestamp)
    }

    /// Validated conversion of one remote candle; values are never rounded.
    pub fn try_from_ohlc(pair_id: i32, ohlc: &OhlcCandle) -> Result<Self, CandleError> {
        PRICE_BOUNDS.check("open", &ohlc.open)?;
        PRICE_BOUNDS.check("high", &ohlc.high)?;
        PRICE_BOUNDS.check("low", &ohlc.low)?;
        PRICE_BOUNDS.check("close", &ohlc.close)?;
        VOLUME_BOUNDS.check("volume", &ohlc.volume)?;

        let timestamp =
            unix_to_naive(ohlc.timestamp).ok_or(CandleError::InvalidTimestamp(ohlc.timestamp))?;

        Ok(Candle {
            pair_id,
            timestamp,
            open: ohlc.open.clone(),
            high: ohlc.high.clone(),
            low: ohlc.low.clone(),
            close: ohlc.close.clone(),
            volume: ohlc.volume.clone(),
        })
    }
}
