use crate::common::serde_fun::deserialize_blank_as_none;
use crate::infra::external::bitstamp::constant;
use crate::infra::external::rest::RestRequest;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One entry of `/trading-pairs-info/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairInfo {
    /// 展示名称，如 "BTC/USD"
    pub name: String,

    /// URL 路径中使用的交易对标识，如 "btcusd"
    pub url_symbol: String,

    /// "Enabled" / "Disabled"
    pub trading: TradingStatus,

    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub description: Option<String>,

    /// 最小下单金额，原样保存，如 "10.00000000 USD"
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub minimum_order: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradingStatus {
    Enabled,
    Disabled,
    #[serde(other)]
    Unknown,
}

impl TradingStatus {
    pub fn is_tradeable(&self) -> bool {
        matches!(self, TradingStatus::Enabled)
    }
}

pub struct FetchTradingPairsInfoRequest;

impl RestRequest for FetchTradingPairsInfoRequest {
    type Response = Vec<PairInfo>;
    type QueryParams = ();

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed(constant::TRADING_PAIRS_INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &str = r#"[
        {"name": "BTC/USD", "url_symbol": "btcusd", "base_decimals": 8, "counter_decimals": 0,
         "instant_order_counter_decimals": 2, "minimum_order": "10 USD", "trading": "Enabled",
         "instant_and_market_orders": "Enabled", "description": "Bitcoin / U.S. dollar"},
        {"name": "XRP/USD", "url_symbol": "xrpusd", "minimum_order": "", "trading": "Disabled",
         "description": "XRP / U.S. dollar"},
        {"name": "NEW/USD", "url_symbol": "newusd", "trading": "Maintenance"}
    ]"#;

    #[test]
    fn parses_pair_list() {
        let pairs: Vec<PairInfo> = serde_json::from_str(PAIRS).unwrap();
        assert_eq!(pairs.len(), 3);

        assert_eq!(pairs[0].url_symbol, "btcusd");
        assert_eq!(pairs[0].name, "BTC/USD");
        assert!(pairs[0].trading.is_tradeable());
        assert_eq!(pairs[0].minimum_order.as_deref(), Some("10 USD"));

        assert_eq!(pairs[1].trading, TradingStatus::Disabled);
        assert_eq!(pairs[1].minimum_order, None);

        assert_eq!(pairs[2].trading, TradingStatus::Unknown);
        assert!(!pairs[2].trading.is_tradeable());
        assert_eq!(pairs[2].description, None);
    }
}
