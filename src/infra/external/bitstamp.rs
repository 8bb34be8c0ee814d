use crate::infra::external::bitstamp::market::{FetchOhlcRequest, OhlcCandle, OhlcQuery};
use crate::infra::external::bitstamp::meta::{FetchTradingPairsInfoRequest, PairInfo};
use crate::infra::external::rate_limiter::bitstamp_limiter::BitstampLimiter;
use crate::infra::external::rest::RestClient;
use crate::infra::external::{ExecutionError, MarketApi};
use async_trait::async_trait;
use tracing::error;

pub mod constant;
pub mod market;
pub mod meta;

#[derive(Debug, Clone)]
pub struct BitstampExchange {
    rest_client: RestClient,
}

impl BitstampExchange {
    pub fn new(base_url: &str, limiter: BitstampLimiter) -> Result<Self, ExecutionError> {
        Ok(Self {
            rest_client: RestClient::new(base_url, limiter)?,
        })
    }

    pub async fn get_trading_pairs_info(&self) -> Result<Vec<PairInfo>, ExecutionError> {
        self.rest_client
            .execute(FetchTradingPairsInfoRequest)
            .await
            .inspect_err(|err| error!("Failed to fetch trading pairs info: {}", err))
    }

    /// Candles come back oldest first. A 404 surfaces as [`ExecutionError::NotFound`].
    pub async fn get_ohlc(
        &self,
        pair_url: &str,
        query: OhlcQuery,
    ) -> Result<Vec<OhlcCandle>, ExecutionError> {
        let request = FetchOhlcRequest {
            pair_url: pair_url.to_string(),
            query,
        };
        let response = self.rest_client.execute(request).await?;
        Ok(response.data.ohlc)
    }
}

#[async_trait]
impl MarketApi for BitstampExchange {
    async fn trading_pairs(&self) -> Result<Vec<PairInfo>, ExecutionError> {
        self.get_trading_pairs_info().await
    }

    async fn ohlc(
        &self,
        pair_url: &str,
        query: OhlcQuery,
    ) -> Result<Vec<OhlcCandle>, ExecutionError> {
        self.get_ohlc(pair_url, query).await
    }
}
