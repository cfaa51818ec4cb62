//! Controller error types.
//!
//! Query outcomes (`dispatch`, `get_tradeable_order`, ...) use
//! [`twap_core::TwapError`]; this enum covers setup only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
