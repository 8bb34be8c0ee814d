use crate::infra::external::ExecutionError;
use diesel::r2d2::PoolError;
use diesel::result::Error as DieselError;
use thiserror::Error;

pub mod candle;
pub mod run_clock;
pub mod trading_pair;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] PoolError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure while syncing one pair or running one stage.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote: {0}")]
    Remote(#[from] ExecutionError),

    #[error("store: {0}")]
    Store(#[from] AppError),

    #[error("candle: {0}")]
    Candle(#[from] candle::CandleError),
}

impl SyncError {
    /// A stage failing this way ends the whole run.
    ///
    /// Only checked at stage level: a single pair's failure is recorded and the loop moves on.
    pub fn aborts_run(&self) -> bool {
        match self {
            SyncError::Remote(err) => err.is_connectivity(),
            SyncError::Store(AppError::PoolError(_)) => true,
            _ => false,
        }
    }
}
