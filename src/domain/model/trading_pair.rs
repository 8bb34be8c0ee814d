use crate::domain::model::run_clock::unix_to_naive;
use crate::infra::external::bitstamp::meta::PairInfo;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

/// 交易对注册表模型
#[derive(Debug, Queryable, Selectable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::trading_pairs)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct TradingPair {
    pub id: i32,

    /// Bitstamp url symbol, e.g. `btcusd`; used as the OHLC path segment
    pub pair_url: String,

    /// Display name, e.g. `BTC/USD`
    pub name: String,

    pub trading_enabled: bool,

    pub last_checked_for_trading: Option<NaiveDateTime>,

    /// First available one-minute candle. Written once, never changed.
    pub start_timestamp: Option<NaiveDateTime>,

    pub start_unix_timestamp: Option<i64>,

    pub description: Option<String>,

    pub minimum_order: Option<String>,
}

/// 新交易对
#[derive(Debug, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::trading_pairs)]
pub struct NewTradingPair {
    pub pair_url: String,
    pub name: String,
    pub trading_enabled: bool,
    pub last_checked_for_trading: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub minimum_order: Option<String>,
}

// 实现从 PairInfo 到 NewTradingPair 的转换
impl From<(&PairInfo, NaiveDateTime)> for NewTradingPair {
    fn from((info, checked_at): (&PairInfo, NaiveDateTime)) -> Self {
        NewTradingPair {
            pair_url: info.url_symbol.clone(),
            name: info.name.clone(),
            trading_enabled: info.trading.is_tradeable(),
            last_checked_for_trading: Some(checked_at),
            description: info.description.clone(),
            minimum_order: info.minimum_order.clone(),
        }
    }
}

/// Resolved first-trade time in both stored forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTimestamp {
    pub at: NaiveDateTime,
    pub unix: i64,
}

impl StartTimestamp {
    pub fn from_unix(unix: i64) -> Option<Self> {
        unix_to_naive(unix).map(|at| Self { at, unix })
    }
}
