use crate::infra::external::bitstamp::market::{OhlcCandle, OhlcQuery};
use crate::infra::external::bitstamp::meta::PairInfo;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub mod bitstamp;
pub mod rate_limiter;
pub mod rest;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("resource not found: {path}")]
    NotFound { path: String },

    #[error("HTTP error {0}: {1}")]
    HttpResponse(StatusCode, String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to deserialise response from {path}: {error}")]
    Deserialise {
        path: String,
        #[source]
        error: serde_json::Error,
    },
}

impl ExecutionError {
    /// The exchange no longer knows the requested resource (delisted pair).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecutionError::NotFound { .. })
    }

    /// The exchange could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ExecutionError::Transport(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

/// Remote market data the sync job depends on.
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn trading_pairs(&self) -> Result<Vec<PairInfo>, ExecutionError>;

    async fn ohlc(&self, pair_url: &str, query: OhlcQuery)
        -> Result<Vec<OhlcCandle>, ExecutionError>;
}
