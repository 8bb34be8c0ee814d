use crate::common::serde_fun::{deserialize_bigdecimal, deserialize_unix_seconds};
use crate::infra::external::bitstamp::constant;
use crate::infra::external::rest::RestRequest;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Query string of `/ohlc/{pair}/`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OhlcQuery {
    pub step: i64,
    pub limit: u32,
    pub start: i64,
    pub exclude_current_candle: bool,
}

impl OhlcQuery {
    /// A full sync page. The still forming minute is never requested.
    pub fn page(start: i64) -> Self {
        Self {
            step: constant::OHLC_STEP_SECS,
            limit: constant::MAX_OHLC_LIMIT,
            start,
            exclude_current_candle: true,
        }
    }

    /// Single candle lookup used while searching for a pair's first trade.
    pub fn lookup(start: i64) -> Self {
        Self {
            step: constant::OHLC_STEP_SECS,
            limit: 1,
            start,
            exclude_current_candle: false,
        }
    }

    /// Seconds covered by a full answer to this query.
    pub fn span_secs(&self) -> i64 {
        self.step * i64::from(self.limit)
    }
}

/// 一根一分钟 K 线，所有数值保持原始十进制精度
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OhlcCandle {
    /// K 线开盘时间（Unix 秒）
    #[serde(deserialize_with = "deserialize_unix_seconds")]
    pub timestamp: i64,

    #[serde(deserialize_with = "deserialize_bigdecimal")]
    pub open: BigDecimal,

    #[serde(deserialize_with = "deserialize_bigdecimal")]
    pub high: BigDecimal,

    #[serde(deserialize_with = "deserialize_bigdecimal")]
    pub low: BigDecimal,

    #[serde(deserialize_with = "deserialize_bigdecimal")]
    pub close: BigDecimal,

    #[serde(deserialize_with = "deserialize_bigdecimal")]
    pub volume: BigDecimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct OhlcData {
    #[serde(default)]
    pub pair: String,

    #[serde(default)]
    pub ohlc: Vec<OhlcCandle>,
}

/// Unknown pairs can come back as `{}` or `{"data": {}}`, both read as "no candles".
#[derive(Debug, Default, Deserialize)]
pub struct OhlcResponse {
    #[serde(default)]
    pub data: OhlcData,
}

pub struct FetchOhlcRequest {
    pub(crate) pair_url: String,
    pub(crate) query: OhlcQuery,
}

impl RestRequest for FetchOhlcRequest {
    type Response = OhlcResponse;
    type QueryParams = OhlcQuery;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(constant::ohlc_path(&self.pair_url))
    }

    fn query_params(&self) -> Option<&Self::QueryParams> {
        Some(&self.query)
    }
}
