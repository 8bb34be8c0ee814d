/// Bitstamp public REST API v2.
pub const BASE_URL: &str = "https://www.bitstamp.net/api/v2";

/// https://www.bitstamp.net/api/#tag/Market-info/operation/GetTradingPairsInfo
/// Every pair the exchange knows about with its trading status.
pub const TRADING_PAIRS_INFO: &str = "/trading-pairs-info/";

/// https://www.bitstamp.net/api/#tag/Market-info/operation/GetOHLCData
pub fn ohlc_path(pair_url: &str) -> String {
    format!("/ohlc/{}/", pair_url)
}

/// Candle width requested from the OHLC endpoint, in seconds.
pub const OHLC_STEP_SECS: i64 = 60;

/// Largest `limit` the OHLC endpoint accepts.
pub const MAX_OHLC_LIMIT: u32 = 1000;
