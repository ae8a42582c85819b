use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for engine, storage, and configuration layers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Budget percentages must total 100% (got {0}%)")]
    PercentageSum(f64),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}
